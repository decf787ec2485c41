use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Installs the tracing subscriber.
///
/// Logs go to the configured log file when there is one. Otherwise headless
/// runs log to stderr and interactive runs stay silent, since stderr shares
/// the screen with the UI.
pub fn init_tracing(config: &AppConfig, headless: bool) -> Result<()> {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|error| eyre!("failed to install log subscriber: {error}"))?;
    } else if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|error| eyre!("failed to install log subscriber: {error}"))?;
    }
    Ok(())
}
