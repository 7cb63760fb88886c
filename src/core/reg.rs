/// Register file seen by the decode stage: two read ports and one write port.
///
/// Reads return the value currently stored in the register. A write is
/// committed when `write` is called, so a stage that wants cycle-start
/// semantics must read before it writes.
pub trait RegisterPorts {
    fn read(&self, reg_index: u8) -> u64;
    fn write(&mut self, reg_index: u8, value: u64);
}

/// General purpose register file with machine word = 64 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u64; 32],
}

pub const REGNAME: [&str; 32] = [
    "zero", // 0
    "ra",   // 1
    "sp",   // 2
    "gp",   // 3
    "tp",   // 4
    "t0",   // 5
    "t1",   // 6
    "t2",   // 7
    "s0",   // 8
    "s1",   // 9
    "a0",   // 10
    "a1",   // 11
    "a2",   // 12
    "a3",   // 13
    "a4",   // 14
    "a5",   // 15
    "a6",   // 16
    "a7",   // 17
    "s2",   // 18
    "s3",   // 19
    "s4",   // 20
    "s5",   // 21
    "s6",   // 22
    "s7",   // 23
    "s8",   // 24
    "s9",   // 25
    "s10",  // 26
    "s11",  // 27
    "t3",   // 28
    "t4",   // 29
    "t5",   // 30
    "t6",   // 31
];

/// ABI name of register `id`. Only the low 5 bits are used.
pub fn reg_name_by_id(id: u8) -> &'static str {
    REGNAME[usize::from(id & 0x1f)]
}

impl RegisterFile {
    /// Get an empty register file
    pub fn empty() -> RegisterFile {
        RegisterFile { regs: [0; 32] }
    }
}

impl RegisterPorts for RegisterFile {
    /// Read from a register
    #[inline]
    fn read(&self, reg_index: u8) -> u64 {
        self.regs[usize::from(reg_index & 0x1f)]
    }

    /// Write into a register. x0 is hard-wired to zero.
    #[inline]
    fn write(&mut self, reg_index: u8, value: u64) {
        let reg_index = usize::from(reg_index & 0x1f);
        if reg_index != 0 {
            self.regs[reg_index] = value;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn demo_reg_file() -> RegisterFile {
        let mut reg_file = RegisterFile::empty();
        for i in 0..32u8 {
            reg_file.write(i, u64::from(i) * 0x100);
        }
        reg_file
    }

    #[test]
    fn read_test() {
        let reg_file = demo_reg_file();
        assert_eq!(reg_file.read(0), 0);
        for i in 1..32u8 {
            assert_eq!(reg_file.read(i), u64::from(i) * 0x100);
        }
    }

    #[test]
    fn zero_is_hard_wired() {
        let mut reg_file = RegisterFile::empty();
        reg_file.write(0, 0xdead_beef);
        assert_eq!(reg_file.read(0), 0);
        assert_eq!(reg_file, RegisterFile::empty());
    }

    #[test]
    fn reg_names() {
        assert_eq!(reg_name_by_id(0), "zero");
        assert_eq!(reg_name_by_id(8), "s0");
        assert_eq!(reg_name_by_id(31), "t6");
    }
}
