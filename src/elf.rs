use std::{fs, path::Path};

use goblin::elf::{header, section_header, Elf};
use log::{debug, info, warn};

use crate::error::{Error, Result};

/// RVC flag in `e_flags`
const EF_RISCV_RVC: u32 = 0x1;

/// Code of the `.text` section, ready to be fed to the decode stage.
pub struct TextSection {
    addr: u64,
    data: Vec<u8>,
}

impl TextSection {
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// `(pc, raw instruction)` pairs, little endian, 4 bytes each.
    /// A trailing partial word is dropped.
    pub fn words(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.data
            .chunks_exact(4)
            .enumerate()
            .map(|(i, bytes)| {
                let pc = self.addr.wrapping_add(4 * i as u64);
                (pc, u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            })
    }
}

pub fn read_text(path: &Path) -> Result<TextSection> {
    let raw_data = fs::read(path)?;
    let elf = Elf::parse(&raw_data)?;

    // Validity check
    if elf.header.e_machine != header::EM_RISCV {
        let msg = format!(
            "Not a RISC-V target ELF: {}, expected: {}",
            elf.header.e_machine,
            header::EM_RISCV
        );
        return Err(Error::InvalidElf(msg));
    }

    info!(
        "ELF file {path:?} is {} bit",
        if elf.is_64 { "64" } else { "32" }
    );
    if elf.header.e_flags & EF_RISCV_RVC != 0 {
        warn!("ELF file {path:?} may contain compressed instructions, which are decoded as 32-bit words");
    }

    let text = elf
        .section_headers
        .iter()
        .find(|sh| {
            sh.sh_type == section_header::SHT_PROGBITS
                && elf.shdr_strtab.get_at(sh.sh_name) == Some(".text")
        })
        .ok_or_else(|| Error::InvalidElf(format!("No .text section in {path:?}")))?;

    let file_range = text
        .file_range()
        .ok_or_else(|| Error::InvalidElf(format!(".text of {path:?} has no file data")))?;
    let data = raw_data
        .get(file_range.clone())
        .ok_or_else(|| Error::InvalidElf(format!(".text range {file_range:#x?} out of file")))?
        .to_vec();

    debug!(".text: addr {:#x}, {} bytes", text.sh_addr, data.len());

    Ok(TextSection {
        addr: text.sh_addr,
        data,
    })
}
