use std::fmt;

use bitflags::bitflags;

use crate::core::insts::{AluSrc, InstFormat};

bitflags! {
    /// Memory and write-back effects of an instruction table entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CtrlFlags: u8 {
        const BRANCH     = 0b0001;
        const MEM_WRITE  = 0b0010;
        const MEM_READ   = 0b0100;
        const MEM_TO_REG = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecFlags {
    pub alu_src: AluSrc,
    /// Coarse ALU category, 2 bits.
    pub alu_op: u8,
    /// Raw `funct3`, forwarded whether or not the word matched.
    pub funct3: u8,
    /// Raw `funct7`, forwarded whether or not the word matched.
    pub funct7: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemFlags {
    pub branch: bool,
    pub mem_write: bool,
    pub mem_read: bool,
}

impl From<CtrlFlags> for MemFlags {
    fn from(flags: CtrlFlags) -> Self {
        MemFlags {
            branch: flags.contains(CtrlFlags::BRANCH),
            mem_write: flags.contains(CtrlFlags::MEM_WRITE),
            mem_read: flags.contains(CtrlFlags::MEM_READ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WbFlags {
    pub mem_to_reg: bool,
}

impl From<CtrlFlags> for WbFlags {
    fn from(flags: CtrlFlags) -> Self {
        WbFlags {
            mem_to_reg: flags.contains(CtrlFlags::MEM_TO_REG),
        }
    }
}

/// Decoder output. The default value is the inert no-op decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlBundle {
    pub format: InstFormat,
    pub exec_flags: ExecFlags,
    pub mem_flags: MemFlags,
    pub wb_flags: WbFlags,
}

impl fmt::Display for ControlBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fmt={:?} alu_src={:?} alu_op={:#04b} funct3={:#05b} funct7={:#09b} \
             branch={} mem_write={} mem_read={} mem_to_reg={}",
            self.format,
            self.exec_flags.alu_src,
            self.exec_flags.alu_op,
            self.exec_flags.funct3,
            self.exec_flags.funct7,
            u8::from(self.mem_flags.branch),
            u8::from(self.mem_flags.mem_write),
            u8::from(self.mem_flags.mem_read),
            u8::from(self.wb_flags.mem_to_reg),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_split_into_groups() {
        let flags = CtrlFlags::MEM_READ | CtrlFlags::MEM_TO_REG;
        assert_eq!(
            MemFlags::from(flags),
            MemFlags {
                branch: false,
                mem_write: false,
                mem_read: true,
            }
        );
        assert!(WbFlags::from(flags).mem_to_reg);
        assert_eq!(MemFlags::from(CtrlFlags::empty()), MemFlags::default());
        assert_eq!(WbFlags::from(CtrlFlags::BRANCH), WbFlags::default());
    }

    #[test]
    fn display_control_bundle() {
        let ctrl = ControlBundle {
            format: InstFormat::I,
            exec_flags: ExecFlags {
                alu_src: AluSrc::Imm,
                alu_op: 0,
                funct3: 0b010,
                funct7: 0,
            },
            mem_flags: MemFlags {
                branch: false,
                mem_write: false,
                mem_read: true,
            },
            wb_flags: WbFlags { mem_to_reg: true },
        };
        assert_eq!(
            ctrl.to_string(),
            "fmt=I alu_src=Imm alu_op=0b00 funct3=0b010 funct7=0b0000000 \
             branch=0 mem_write=0 mem_read=1 mem_to_reg=1"
        );
    }
}
