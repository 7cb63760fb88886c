//! Decode phase.
//!
//! Classifies the raw word against the instruction table, derives the
//! EX/MEM/WB control signals and rebuilds the immediate. Unknown encodings
//! decode to the all-zero control bundle with format R, so they flow down
//! the pipeline as a no-op.

use log::{debug, trace};

use crate::core::{
    insts::{
        concat_bit_fields, extract_bits, fill, funct3, funct7, opcode, rd, rs1, rs2, sext,
        InstFormat,
    },
    reg::RegisterPorts,
};

use super::{
    ctrl_flags::{ControlBundle, ExecFlags},
    debug::d_pinst,
    phases::{InternalDecodeExec, InternalFetchDecode, RegWriteReq},
    table::{InstSpec, InstTable, INST_TABLE},
};

pub fn decode<R: RegisterPorts>(
    reg_file: &mut R,
    itl_f_d: &InternalFetchDecode,
    reg_write: &RegWriteReq,
    pipeline_info: bool,
) -> InternalDecodeExec {
    let inst = itl_f_d.raw_inst;
    let (rs1, rs2) = (rs1(inst), rs2(inst));

    // Read ports see the value stored at the start of the cycle.
    let src1 = reg_file.read(rs1);
    let src2 = reg_file.read(rs2);
    if reg_write.enable {
        reg_file.write(reg_write.addr, reg_write.data);
    }

    let ctrl = control(inst);
    let imm = gen_imm(inst, ctrl.format);

    let itl_d_e = InternalDecodeExec {
        raw_inst: inst,
        pc: itl_f_d.pc,
        rs1,
        rs2,
        rd: rd(inst),
        src1,
        src2,
        imm,
        ctrl,
    };

    if pipeline_info {
        trace!("ID : {}", d_pinst(&itl_d_e));
    }

    itl_d_e
}

/// Control signals of `inst` against the RV64 table.
pub fn control(inst: u32) -> ControlBundle {
    control_with(&INST_TABLE, inst)
}

/// Control signals of `inst` against `table`.
///
/// `funct3` and `funct7` are forwarded raw so the execute stage can tell
/// apart instructions sharing an `alu_op` (add and sub). If several entries
/// match, the last one in table order wins; a validated table never has
/// more than one.
pub fn control_with(table: &InstTable, inst: u32) -> ControlBundle {
    let (opcode, funct3, funct7) = (opcode(inst), funct3(inst), funct7(inst));

    let init = ControlBundle {
        exec_flags: ExecFlags {
            funct3,
            funct7,
            ..ExecFlags::default()
        },
        ..ControlBundle::default()
    };

    let mut matched = false;
    let ctrl = table
        .iter()
        .filter(|spec| spec.matches(opcode, funct3, funct7))
        .fold(init, |ctrl, spec| {
            matched = true;
            set_control_signals(ctrl, spec)
        });

    if !matched {
        debug!("No instruction matches {inst:#010x} (opcode {opcode:#09b}), decoded as noop");
    }
    ctrl
}

fn set_control_signals(mut ctrl: ControlBundle, spec: &InstSpec) -> ControlBundle {
    ctrl.format = spec.format;

    ctrl.exec_flags.alu_src = spec.alu_src;
    ctrl.exec_flags.alu_op = spec.alu_op;

    ctrl.mem_flags = spec.flags.into();
    ctrl.wb_flags = spec.flags.into();

    ctrl
}

/// Rebuild the immediate of `inst` for `format`, sign-extended to XLEN.
///
/// ```text
/// I: inst[31]x21 | inst[30:25] | inst[24:21] | inst[20]
/// S: inst[31]x21 | inst[30:25] | inst[11:7]
/// B: inst[31]x20 | inst[7]     | inst[30:25] | inst[11:8]  | 0
/// U: inst[31:12] | 0 (12 bits)
/// J: inst[31]x12 | inst[19:12] | inst[20]    | inst[30:25] | inst[24:21] | 0
/// ```
pub fn gen_imm(inst: u32, format: InstFormat) -> i64 {
    let field = |high: u8, low: u8| (extract_bits(inst, high, low), high - low + 1);
    let sign = extract_bits(inst, 31, 31);
    let zero = (0, 1);

    let imm = match format {
        InstFormat::R => 0,
        InstFormat::I => concat_bit_fields(&[
            fill(sign, 21),
            field(30, 25),
            field(24, 21),
            field(20, 20),
        ]),
        InstFormat::S => concat_bit_fields(&[fill(sign, 21), field(30, 25), field(11, 7)]),
        InstFormat::B => concat_bit_fields(&[
            fill(sign, 20),
            field(7, 7),
            field(30, 25),
            field(11, 8),
            zero,
        ]),
        InstFormat::U => concat_bit_fields(&[field(31, 12), fill(0, 12)]),
        InstFormat::J => concat_bit_fields(&[
            fill(sign, 12),
            field(19, 12),
            field(20, 20),
            field(30, 25),
            field(24, 21),
            zero,
        ]),
    };

    // Bit 31 of the assembled value is the sign for every format, U included.
    sext(u64::from(imm), 32)
}
