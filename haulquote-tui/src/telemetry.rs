use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context as _, Error, Result};
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Install a file-backed subscriber when a log file is configured.
pub(crate) fn init(config: &TelemetryConfig) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let env_filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter '{}'", config.log_filter))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(Error::msg)
        .context("cannot install tracing subscriber")
}
