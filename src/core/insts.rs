//! Instruction fields, opcodes and bit helpers.

/// Machine word length under 64-bit
pub const XLEN: u8 = 64;

/// Extract the inclusive bit slice `inst[high:low]`, zero-extended.
pub fn extract_bits(inst: u32, high: u8, low: u8) -> u32 {
    debug_assert!(high < 32 && high >= low, "invalid bit range [{high}:{low}]");
    (inst >> low) & low_mask(high - low + 1)
}

/// Mask covering the lowest `width` bits.
#[inline(always)]
fn low_mask(width: u8) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// Extract `opcode` field from the instruction.
pub fn opcode(inst: u32) -> u32 {
    extract_bits(inst, 6, 0)
}

/// Extract `rd` field from the instruction.
pub fn rd(inst: u32) -> u8 {
    extract_bits(inst, 11, 7) as u8
}

/// Extract `funct3` field from the instruction.
pub fn funct3(inst: u32) -> u8 {
    extract_bits(inst, 14, 12) as u8
}

/// Extract `rs1` field from the instruction.
pub fn rs1(inst: u32) -> u8 {
    extract_bits(inst, 19, 15) as u8
}

/// Extract `rs2` field from the instruction.
pub fn rs2(inst: u32) -> u8 {
    extract_bits(inst, 24, 20) as u8
}

/// Extract `funct7` field from the instruction.
pub fn funct7(inst: u32) -> u8 {
    extract_bits(inst, 31, 25) as u8
}

/// RV64 base opcode map, `inst[6:0]`.
#[allow(non_upper_case_globals, dead_code)]
pub mod inst_64_opcode {
    pub const /* I  */ LOAD: u32 = 0b00_000_11;
    pub const /* I  */ LOAD_FP: u32 = 0b00_001_11;
    pub const CUSTOM0: u32 = 0b00_010_11;
    pub const /* I  */ MISC_MEM: u32 = 0b00_011_11;
    pub const /* I  */ OP_IMM: u32 = 0b00_100_11;
    pub const /* U  */ AUIPC: u32 = 0b00_101_11;
    pub const /* I  */ OP_IMM_32: u32 = 0b00_110_11;

    pub const /* S  */ STORE: u32 = 0b01_000_11;
    pub const /* S  */ STORE_FP: u32 = 0b01_001_11;
    pub const CUSTOM1: u32 = 0b01_010_11;
    pub const /* R  */ AMO: u32 = 0b01_011_11;
    pub const /* R  */ OP: u32 = 0b01_100_11;
    pub const /* U  */ LUI: u32 = 0b01_101_11;
    pub const /* R  */ OP_32: u32 = 0b01_110_11;

    pub const /* R4 */ MADD: u32 = 0b10_000_11;
    pub const /* R4 */ MSUB: u32 = 0b10_001_11;
    pub const /* R4 */ NMSUB: u32 = 0b10_010_11;
    pub const /* R4 */ NMADD: u32 = 0b10_011_11;
    pub const /* R  */ OP_FP: u32 = 0b10_100_11;
    pub const CUSTOM2: u32 = 0b10_110_11;

    pub const /* B  */ BRANCH: u32 = 0b11_000_11;
    pub const /* I  */ JALR: u32 = 0b11_001_11;
    pub const /* J  */ JAL: u32 = 0b11_011_11;
    pub const /* I  */ SYSTEM: u32 = 0b11_100_11;
    pub const CUSTOM3: u32 = 0b11_110_11;
}

/// Instruction layout class. Decides where the immediate bits live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstFormat {
    #[default]
    R,
    I,
    S,
    B,
    U,
    J,
}

/// Source of ALU operand 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AluSrc {
    #[default]
    Reg = 0,
    Imm = 1,
}

/// Replicate bit `sign_bit` of `value` over every higher bit up to
/// `target_width`. Bits at or above `target_width` are cleared.
pub fn sign_extend(value: u64, sign_bit: u8, target_width: u8) -> u64 {
    assert!(
        sign_bit < target_width && target_width <= XLEN,
        "cannot extend bit {sign_bit} to {target_width} bits"
    );
    // Move the sign bit to bit 63, then shift back arithmetically.
    let shift = u32::from(XLEN - 1 - sign_bit);
    let extended = (((value << shift) as i64) >> shift) as u64;
    if target_width == XLEN {
        extended
    } else {
        extended & ((1u64 << target_width) - 1)
    }
}

/// Sign-extend the low `bit_width` bits of `value` to 64 bits.
pub fn sext(value: u64, bit_width: u8) -> i64 {
    assert!(bit_width > 0 && bit_width <= XLEN, "bit_width out of range");
    sign_extend(value, bit_width - 1, XLEN) as i64
}

/// `count` copies of the lowest bit of `bit`, as a `(value, width)` field.
pub fn fill(bit: u32, count: u8) -> (u32, u8) {
    let value = if bit & 1 == 1 { low_mask(count) } else { 0 };
    (value, count)
}

/// Concatenate `(value, width)` fields, first field in the highest bits.
/// Each value is truncated to its width.
pub fn concat_bit_fields(fields: &[(u32, u8)]) -> u32 {
    debug_assert!(
        fields.iter().map(|&(_, width)| u32::from(width)).sum::<u32>() <= 32,
        "concatenation wider than 32 bits"
    );
    fields.iter().fold(0u64, |acc, &(value, width)| {
        (acc << width) | u64::from(value & low_mask(width))
    }) as u32
}
