//! CLI command implementations

pub mod balance;
pub mod config;
pub mod logs;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use remittance_core::config::Config;
use remittance_core::{LogEvent, LoggingService, RemittanceContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging is disabled or fails to initialize (it must
/// never block a command)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    let config = Config::load(&data_dir).ok()?;
    if !config.event_logging {
        return None;
    }
    LoggingService::new(&data_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Record an event if logging is on; failures are ignored
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.record(&event);
    }
}

/// Get the data directory from REMITTANCE_DIR or default to ~/.remittance
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("REMITTANCE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".remittance"))
        .ok_or_else(|| anyhow!("Could not find home directory; set REMITTANCE_DIR"))
}

/// Open the remittance context, creating the data directory if needed
pub fn get_context() -> Result<RemittanceContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    RemittanceContext::new(&data_dir).context("Failed to initialize remittance context")
}
