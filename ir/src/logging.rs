use std::fs::{File, OpenOptions};
use std::sync::Mutex;

use tracing::debug;

use crate::{config::Config, error::IrError};

/// Whether an existing log file is kept or started afresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Truncate,
    Append,
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// Only the first call in a process installs anything; later calls (an
/// in-process generator reloading a snapshot, for instance) keep the
/// subscriber that is already there.
pub fn init_logging(config: &Config, mode: LogMode) -> Result<(), IrError> {
    let level = config.level()?;
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .without_time();

    let installed = match config.log_path() {
        Some(path) => {
            if mode == LogMode::Truncate {
                File::create(&path)?;
            }
            // Shared with generator processes: always write at the end.
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder.with_writer(Mutex::new(file)).try_init().is_ok()
        }
        None => builder.with_writer(std::io::stderr).try_init().is_ok(),
    };

    if !installed {
        debug!("Logging already initialised, keeping the current subscriber");
    }
    Ok(())
}
