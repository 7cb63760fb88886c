#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error when performing I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error when loading ELF: {0}")]
    LoadElf(#[from] goblin::error::Error),
    #[error("Invalid ELF format: {0}")]
    InvalidElf(String),
    #[error("Invalid instruction word: {0}")]
    ParseWord(String),
    #[error("Error when initializing logger: {0}")]
    Logger(String),
    #[error("Conflicting instruction encodings: `{first}` and `{second}` can match the same word")]
    TableConflict {
        first: &'static str,
        second: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
