use std::path::Path;

use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

use crate::error::{Error, Result};

const LOG_PATTERN: &str = "{h({l:<5})} {M} - {m}{n}";

/// Install the global logger.
///
/// With a config file the whole setup comes from the YAML; otherwise logs go
/// to stderr at `level`, leaving stdout for decoded output.
pub fn init(config_file: Option<&Path>, level: LevelFilter) -> Result<()> {
    if let Some(path) = config_file {
        return log4rs::init_file(path, Default::default())
            .map_err(|e| Error::Logger(format!("{path:?}: {e}")));
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| Error::Logger(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| Error::Logger(e.to_string()))?;
    Ok(())
}
