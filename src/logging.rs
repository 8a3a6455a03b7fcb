use std::fs::OpenOptions;

use anyhow::{Context, Result};
use env_logger::{Builder, Target};

use crate::config;

pub const LOG_ENV: &str = "CHIPDX_LOG";
const LOG_FILE_NAME: &str = "chipdx.log";

/// Install a file logger when `CHIPDX_LOG` is set.
///
/// Output goes to the cache directory rather than stderr so it does not
/// interleave with the alternate screen.
pub fn init() -> Result<()> {
    let Ok(filter) = std::env::var(LOG_ENV) else {
        return Ok(());
    };

    let path = config::cache_dir()?.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    Builder::new()
        .parse_filters(&filter)
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("failed to install logger")?;

    log::info!("logging to {}", path.display());
    Ok(())
}
