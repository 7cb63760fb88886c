use crate::core::{
    insts::{inst_64_opcode::JALR, opcode, InstFormat},
    reg::reg_name_by_id,
};

use super::{phases::InternalDecodeExec, table::INST_TABLE};

/// One-line disassembly of a decoded instruction.
pub fn d_pinst(itl: &InternalDecodeExec) -> String {
    let pc = itl.pc;
    let Some(name) = INST_TABLE.mnemonic(itl.raw_inst) else {
        return format!("{:8x}:\tunknown\t{:#010x}", pc, itl.raw_inst);
    };

    let rd = reg_name_by_id(itl.rd);
    let rs1 = reg_name_by_id(itl.rs1);
    let rs2 = reg_name_by_id(itl.rs2);
    let imm = itl.imm;

    let operands = match itl.ctrl.format {
        InstFormat::R => format!("{rd},{rs1},{rs2}"),
        // LOAD, JALR
        InstFormat::I if itl.ctrl.mem_flags.mem_read || opcode(itl.raw_inst) == JALR => {
            format!("{rd},{imm}({rs1})")
        }
        InstFormat::I => format!("{rd},{rs1},{imm}"),
        InstFormat::S => format!("{rs2},{imm}({rs1})"),
        InstFormat::B => format!("{rs1},{rs2},{:x}", pc.wrapping_add_signed(imm)),
        InstFormat::U => format!("{rd},{:#x}", (imm as u64 >> 12) & 0xf_ffff),
        InstFormat::J => format!("{rd},{:x}", pc.wrapping_add_signed(imm)),
    };
    format!("{pc:8x}:\t{name}\t{operands}")
}
