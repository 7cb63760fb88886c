//! Instruction table.
//!
//! Every supported instruction is one immutable [`InstSpec`]: a match
//! predicate over `(opcode, funct3, funct7)` and the control payload the
//! decoder emits when the predicate holds. The table rejects any pair of
//! entries that could both match the same instruction word.

use std::sync::LazyLock;

use log::{debug, error};

use crate::{
    core::insts::{funct3, funct7, inst_64_opcode::*, opcode, AluSrc, InstFormat},
    error::{Error, Result},
};

use super::ctrl_flags::CtrlFlags;

/// Predicate on a secondary opcode field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Exact(u8),
    DontCare,
}

impl MatchField {
    pub fn matches(self, value: u8) -> bool {
        match self {
            MatchField::Exact(expected) => expected == value,
            MatchField::DontCare => true,
        }
    }

    /// Whether some field value satisfies both predicates.
    pub fn overlaps(self, other: MatchField) -> bool {
        match (self, other) {
            (MatchField::Exact(a), MatchField::Exact(b)) => a == b,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstSpec {
    pub mnemonic: &'static str,

    // Data to match against
    pub opcode: u32,
    pub funct3: MatchField,
    pub funct7: MatchField,

    // Control payload
    pub format: InstFormat,
    pub alu_src: AluSrc,
    pub alu_op: u8,
    pub flags: CtrlFlags,
}

impl InstSpec {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        mnemonic: &'static str,
        opcode: u32,
        funct3: MatchField,
        funct7: MatchField,
        format: InstFormat,
        alu_src: AluSrc,
        alu_op: u8,
        flags: CtrlFlags,
    ) -> InstSpec {
        InstSpec {
            mnemonic,
            opcode,
            funct3,
            funct7,
            format,
            alu_src,
            alu_op,
            flags,
        }
    }

    pub fn matches(&self, opcode: u32, funct3: u8, funct7: u8) -> bool {
        self.opcode == opcode && self.funct3.matches(funct3) && self.funct7.matches(funct7)
    }

    /// Whether some instruction word satisfies both predicates.
    pub fn overlaps(&self, other: &InstSpec) -> bool {
        self.opcode == other.opcode
            && self.funct3.overlaps(other.funct3)
            && self.funct7.overlaps(other.funct7)
    }
}

use AluSrc::{Imm, Reg};
use InstFormat::{B, I, J, R, S, U};
use MatchField::{DontCare, Exact};

const NONE: CtrlFlags = CtrlFlags::empty();
const LOAD_FLAGS: CtrlFlags = CtrlFlags::MEM_READ.union(CtrlFlags::MEM_TO_REG);
const STORE_FLAGS: CtrlFlags = CtrlFlags::MEM_WRITE;
const BRANCH_FLAGS: CtrlFlags = CtrlFlags::BRANCH;

#[rustfmt::skip]
pub const RV64_SPECS: &[InstSpec] = &[
    // R type
    InstSpec::new("add",  OP, Exact(0b000), Exact(0b0000000), R, Reg, 0b10, NONE),
    InstSpec::new("sub",  OP, Exact(0b000), Exact(0b0100000), R, Reg, 0b10, NONE),
    InstSpec::new("sll",  OP, Exact(0b001), Exact(0b0000000), R, Reg, 0b10, NONE),
    InstSpec::new("xor",  OP, Exact(0b100), Exact(0b0000000), R, Reg, 0b10, NONE),
    InstSpec::new("srl",  OP, Exact(0b101), Exact(0b0000000), R, Reg, 0b10, NONE),
    InstSpec::new("or",   OP, Exact(0b110), Exact(0b0000000), R, Reg, 0b10, NONE),
    InstSpec::new("and",  OP, Exact(0b111), Exact(0b0000000), R, Reg, 0b10, NONE),

    // I type
    InstSpec::new("lb",   LOAD, Exact(0b000), DontCare, I, Reg, 0b00, LOAD_FLAGS),
    InstSpec::new("lh",   LOAD, Exact(0b001), DontCare, I, Reg, 0b00, LOAD_FLAGS),
    InstSpec::new("lw",   LOAD, Exact(0b010), DontCare, I, Reg, 0b00, LOAD_FLAGS),
    InstSpec::new("ld",   LOAD, Exact(0b011), DontCare, I, Reg, 0b00, LOAD_FLAGS),
    InstSpec::new("lbu",  LOAD, Exact(0b100), DontCare, I, Reg, 0b00, LOAD_FLAGS),
    InstSpec::new("lhu",  LOAD, Exact(0b101), DontCare, I, Reg, 0b00, LOAD_FLAGS),
    InstSpec::new("lwu",  LOAD, Exact(0b110), DontCare, I, Reg, 0b00, LOAD_FLAGS),
    InstSpec::new("addi", OP_IMM, Exact(0b000), DontCare, I, Imm, 0b00, NONE),
    InstSpec::new("slli", OP_IMM, Exact(0b001), Exact(0b0000000), I, Imm, 0b00, NONE),
    InstSpec::new("xori", OP_IMM, Exact(0b100), DontCare, I, Imm, 0b00, NONE),
    InstSpec::new("srli", OP_IMM, Exact(0b101), Exact(0b0000000), I, Imm, 0b00, NONE),
    InstSpec::new("srai", OP_IMM, Exact(0b101), Exact(0b0100000), I, Imm, 0b00, NONE),
    InstSpec::new("ori",  OP_IMM, Exact(0b110), DontCare, I, Imm, 0b00, NONE),
    InstSpec::new("andi", OP_IMM, Exact(0b111), DontCare, I, Imm, 0b00, NONE),
    InstSpec::new("jalr", JALR, Exact(0b000), DontCare, I, Reg, 0b00, NONE),

    // S type
    InstSpec::new("sb",   STORE, Exact(0b000), DontCare, S, Reg, 0b00, STORE_FLAGS),
    InstSpec::new("sh",   STORE, Exact(0b001), DontCare, S, Reg, 0b00, STORE_FLAGS),
    InstSpec::new("sw",   STORE, Exact(0b010), DontCare, S, Reg, 0b00, STORE_FLAGS),
    InstSpec::new("sd",   STORE, Exact(0b011), DontCare, S, Reg, 0b00, STORE_FLAGS),

    // B type
    InstSpec::new("beq",  BRANCH, Exact(0b000), DontCare, B, Reg, 0b01, BRANCH_FLAGS),
    InstSpec::new("bne",  BRANCH, Exact(0b001), DontCare, B, Reg, 0b01, BRANCH_FLAGS),
    InstSpec::new("blt",  BRANCH, Exact(0b100), DontCare, B, Reg, 0b01, BRANCH_FLAGS),
    InstSpec::new("bge",  BRANCH, Exact(0b101), DontCare, B, Reg, 0b01, BRANCH_FLAGS),
    InstSpec::new("bltu", BRANCH, Exact(0b110), DontCare, B, Reg, 0b01, BRANCH_FLAGS),
    InstSpec::new("bgeu", BRANCH, Exact(0b111), DontCare, B, Reg, 0b01, BRANCH_FLAGS),

    // U type
    InstSpec::new("lui",  LUI, DontCare, DontCare, U, Reg, 0b00, NONE),

    // J type
    InstSpec::new("jal",  JAL, DontCare, DontCare, J, Reg, 0b00, BRANCH_FLAGS),
];

/// Ordered, validated instruction table.
#[derive(Debug, Clone)]
pub struct InstTable {
    specs: Vec<InstSpec>,
}

impl InstTable {
    /// Build a table, rejecting any two entries that can match the same word.
    pub fn new(specs: &[InstSpec]) -> Result<InstTable> {
        for (i, first) in specs.iter().enumerate() {
            if let Some(second) = specs[i + 1..].iter().find(|other| first.overlaps(other)) {
                error!(
                    "Instruction table conflict: `{}` overlaps `{}`",
                    first.mnemonic, second.mnemonic
                );
                return Err(Error::TableConflict {
                    first: first.mnemonic,
                    second: second.mnemonic,
                });
            }
        }
        debug!("Instruction table built with {} entries", specs.len());
        Ok(InstTable {
            specs: specs.to_vec(),
        })
    }

    /// Build a table without the exclusivity check.
    #[cfg(test)]
    pub(crate) fn new_unchecked(specs: &[InstSpec]) -> InstTable {
        InstTable {
            specs: specs.to_vec(),
        }
    }

    /// Entries in construction order.
    pub fn iter(&self) -> impl Iterator<Item = &InstSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Entry matching `inst`; the last one in table order if several do.
    pub fn lookup(&self, inst: u32) -> Option<&InstSpec> {
        let (opcode, funct3, funct7) = (opcode(inst), funct3(inst), funct7(inst));
        self.specs
            .iter()
            .rev()
            .find(|spec| spec.matches(opcode, funct3, funct7))
    }

    pub fn mnemonic(&self, inst: u32) -> Option<&'static str> {
        self.lookup(inst).map(|spec| spec.mnemonic)
    }
}

/// Process-wide RV64 table. A conflicting table is a configuration defect
/// and aborts on first use.
pub static INST_TABLE: LazyLock<InstTable> = LazyLock::new(|| match InstTable::new(RV64_SPECS) {
    Ok(table) => table,
    Err(e) => panic!("Fail to build instruction table: {e}"),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_field() {
        assert!(Exact(0b101).matches(0b101));
        assert!(!Exact(0b101).matches(0b100));
        assert!(DontCare.matches(0));
        assert!(DontCare.matches(0x7f));

        assert!(Exact(1).overlaps(Exact(1)));
        assert!(!Exact(1).overlaps(Exact(2)));
        assert!(Exact(1).overlaps(DontCare));
        assert!(DontCare.overlaps(Exact(2)));
        assert!(DontCare.overlaps(DontCare));
    }

    #[test]
    fn rv64_table_is_exclusive() {
        let table = InstTable::new(RV64_SPECS).expect("RV64 table must be valid");
        assert_eq!(table.len(), 34);
        assert!(!table.is_empty());
        assert_eq!(INST_TABLE.len(), RV64_SPECS.len());
        assert!(InstTable::new(&[]).unwrap().is_empty());

        for (i, a) in RV64_SPECS.iter().enumerate() {
            for b in &RV64_SPECS[i + 1..] {
                assert!(!a.overlaps(b), "{} overlaps {}", a.mnemonic, b.mnemonic);
            }
        }
    }

    #[test]
    fn mnemonics_are_unique() {
        for (i, a) in RV64_SPECS.iter().enumerate() {
            assert!(
                RV64_SPECS[i + 1..].iter().all(|b| b.mnemonic != a.mnemonic),
                "duplicate {}",
                a.mnemonic
            );
        }
    }

    #[test]
    fn conflicting_table_is_rejected() {
        let specs = [
            InstSpec::new("addi", OP_IMM, Exact(0b000), DontCare, I, Imm, 0b00, NONE),
            InstSpec::new("slli", OP_IMM, Exact(0b001), Exact(0), I, Imm, 0b00, NONE),
            InstSpec::new("any", OP_IMM, DontCare, Exact(0b0100000), I, Imm, 0b11, NONE),
        ];
        match InstTable::new(&specs) {
            Err(Error::TableConflict { first, second }) => {
                assert_eq!(first, "addi");
                assert_eq!(second, "any");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn funct7_distinguishes_entries() {
        // srli and srai differ only in funct7
        let specs = [
            InstSpec::new("srli", OP_IMM, Exact(0b101), Exact(0), I, Imm, 0b00, NONE),
            InstSpec::new("srai", OP_IMM, Exact(0b101), Exact(0b0100000), I, Imm, 0b00, NONE),
        ];
        assert!(InstTable::new(&specs).is_ok());

        let specs = [
            InstSpec::new("srli", OP_IMM, Exact(0b101), DontCare, I, Imm, 0b00, NONE),
            InstSpec::new("srai", OP_IMM, Exact(0b101), Exact(0b0100000), I, Imm, 0b00, NONE),
        ];
        assert!(InstTable::new(&specs).is_err());
    }

    #[test]
    fn lookup_by_word() {
        assert_eq!(INST_TABLE.mnemonic(0xffc3_0293), Some("addi")); // addi t0,t1,-4
        assert_eq!(INST_TABLE.mnemonic(0x0084_2383), Some("lw")); // lw t2,8(s0)
        assert_eq!(INST_TABLE.mnemonic(0x0020_8863), Some("beq")); // beq ra,sp,16
        assert_eq!(INST_TABLE.mnemonic(0x4020_81b3), Some("sub")); // sub gp,ra,sp
        assert_eq!(INST_TABLE.mnemonic(0x0000_8067), Some("jalr")); // ret
        assert_eq!(INST_TABLE.mnemonic(0x0000_007f), None);
        // slt is not in the table
        assert_eq!(INST_TABLE.mnemonic(0x0020_a1b3), None);
    }

    #[test]
    fn lookup_prefers_last_match() {
        let table = InstTable::new_unchecked(&[
            InstSpec::new("first", LUI, DontCare, DontCare, U, Reg, 0b00, NONE),
            InstSpec::new("second", LUI, Exact(0), DontCare, U, Reg, 0b00, NONE),
        ]);
        assert_eq!(table.mnemonic(0x0000_0037), Some("second"));
        assert_eq!(table.mnemonic(0x0000_1037), Some("first"));
    }
}
