//! Log setup for the terminal runner.
//!
//! The terminal is in raw mode on the alternate screen while the game runs,
//! so records go to a file. `RUST_LOG` overrides the configured level.

use std::fs::OpenOptions;

use anyhow::{Context, Result};
use env_logger::{Builder, Target};

use crate::config::LogConfig;

/// Install the global logger. Does nothing when no file is configured.
pub fn init(config: &LogConfig) -> Result<()> {
    let Some(path) = config.file.as_ref() else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    Builder::new()
        .parse_filters(&config.level)
        .parse_env("RUST_LOG")
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("installing logger")?;
    Ok(())
}
