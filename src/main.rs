use std::{path::PathBuf, process};

use clap::Parser;
use crate::core::reg::RegisterFile;
use elf::read_text;
use error::{Error, Result};
use log::{debug, error, info, LevelFilter};
use multi_stage::{
    debug::d_pinst,
    decode::decode,
    phases::{InternalFetchDecode, RegWriteReq},
    table::INST_TABLE,
};

mod core;
mod elf;
mod error;
mod logger;
mod multi_stage;

#[derive(Parser, Debug)]
#[command(version, about = "Decode RV64 instruction words into pipeline control signals", long_about = None)]
struct Args {
    /// Instruction words to decode (`0x` hex, `0b` binary or decimal)
    words: Vec<String>,

    /// Decode the `.text` section of a RISC-V ELF instead of WORDS
    #[arg(short, long, conflicts_with = "words")]
    elf: Option<PathBuf>,

    /// PC of the first word given on the command line
    #[arg(long, default_value = "0", value_parser = parse_pc)]
    pc: u64,

    /// Print the decode stage trace (raises --log-level to trace)
    #[arg(short, long)]
    trace: bool,

    /// Log level when no log4rs config file is given
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// log4rs YAML configuration file
    #[arg(long)]
    log_config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = logger::init(args.log_config.as_deref(), log_level(&args)) {
        eprintln!("{e}");
        process::exit(1);
    }

    if let Err(e) = run(&args) {
        error!("{e}");
        process::exit(1);
    }
}

/// Root level of the default logger. The decode trace is logged at trace.
fn log_level(args: &Args) -> LevelFilter {
    if args.trace {
        LevelFilter::Trace
    } else {
        args.log_level
    }
}

fn run(args: &Args) -> Result<()> {
    let insts: Vec<(u64, u32)> = match &args.elf {
        Some(path) => {
            info!("Loading file: {path:?}");
            let text = read_text(path)?;
            info!(".text starts at {:#x}", text.addr());
            text.words().collect()
        }
        None => args
            .words
            .iter()
            .zip((0..).map(|i: u64| args.pc.wrapping_add(4 * i)))
            .map(|(word, pc)| parse_word(word).map(|raw_inst| (pc, raw_inst)))
            .collect::<Result<_>>()?,
    };

    debug!("Decoding {} words against {} known instructions", insts.len(), INST_TABLE.len());

    // Nothing is written back: every word sees the same empty register file.
    let mut reg_file = RegisterFile::empty();
    let no_write = RegWriteReq::default();

    for (pc, raw_inst) in insts {
        let itl_f_d = InternalFetchDecode { raw_inst, pc };
        let itl_d_e = decode(&mut reg_file, &itl_f_d, &no_write, args.trace);
        println!(
            "{}\t[{:#010x}] imm={} {}",
            d_pinst(&itl_d_e),
            raw_inst,
            itl_d_e.imm,
            itl_d_e.ctrl
        );
    }
    Ok(())
}

fn parse_int(s: &str) -> std::result::Result<u64, std::num::ParseIntError> {
    let s = s.replace('_', "");
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2)
    } else {
        s.parse()
    }
}

fn parse_pc(s: &str) -> std::result::Result<u64, String> {
    parse_int(s).map_err(|e| format!("invalid pc `{s}`: {e}"))
}

fn parse_word(s: &str) -> Result<u32> {
    let value = parse_int(s).map_err(|e| Error::ParseWord(format!("`{s}`: {e}")))?;
    u32::try_from(value).map_err(|_| Error::ParseWord(format!("`{s}` does not fit in 32 bits")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_words() {
        assert_eq!(parse_word("0xffc30293").unwrap(), 0xffc3_0293);
        assert_eq!(parse_word("0x0084_2383").unwrap(), 0x0084_2383);
        assert_eq!(parse_word("0b1111111").unwrap(), 0x7f);
        assert_eq!(parse_word("19").unwrap(), 0x13);
        assert!(matches!(parse_word("0x1_0000_0000"), Err(Error::ParseWord(_))));
        assert!(matches!(parse_word("addi"), Err(Error::ParseWord(_))));
    }

    #[test]
    fn parse_args() {
        let args = Args::try_parse_from(["idecode", "--pc", "0x1000", "0x13", "0x8067"]).unwrap();
        assert_eq!(args.pc, 0x1000);
        assert_eq!(args.words, vec!["0x13", "0x8067"]);
        assert_eq!(args.log_level, LevelFilter::Info);
        assert!(args.elf.is_none());

        assert!(Args::try_parse_from(["idecode", "--elf", "a.out", "0x13"]).is_err());
    }

    #[test]
    fn trace_raises_log_level() {
        let args = Args::try_parse_from(["idecode", "0x13"]).unwrap();
        assert_eq!(log_level(&args), LevelFilter::Info);

        let args = Args::try_parse_from(["idecode", "--trace", "0x13"]).unwrap();
        assert_eq!(log_level(&args), LevelFilter::Trace);

        let args = Args::try_parse_from(["idecode", "-t", "--log-level", "warn", "0x13"]).unwrap();
        assert_eq!(log_level(&args), LevelFilter::Trace);

        let args = Args::try_parse_from(["idecode", "--log-level", "debug", "0x13"]).unwrap();
        assert_eq!(log_level(&args), LevelFilter::Debug);
    }

    #[test]
    fn run_rejects_bad_word() {
        let args = Args::try_parse_from(["idecode", "0x13", "nope"]).unwrap();
        assert!(matches!(run(&args), Err(Error::ParseWord(_))));
    }
}
