use super::ctrl_flags::ControlBundle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternalFetchDecode {
    pub raw_inst: u32,
    pub pc: u64, // current instruction PC
}

/// Write-back request coming from a later stage, forwarded to the register
/// file write port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegWriteReq {
    pub addr: u8,
    pub enable: bool,
    pub data: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InternalDecodeExec {
    pub raw_inst: u32,
    pub pc: u64, // current instruction PC
    pub rs1: u8,
    pub rs2: u8,
    pub rd: u8,
    pub src1: u64,
    pub src2: u64,
    pub imm: i64, // already sign-extended to XLEN
    pub ctrl: ControlBundle,
}
