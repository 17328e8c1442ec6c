//! Configuration management
//!
//! Settings live in settings.json inside the data directory:
//! ```json
//! {
//!   "app": { "database": "remittance.duckdb", "eventLogging": true, ... }
//! }
//! ```
//! Unknown keys are preserved when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default account store file name
pub const DEFAULT_DATABASE: &str = "remittance.duckdb";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_logging: Option<bool>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Remittance configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Account store file name, relative to the data directory
    pub database: String,
    /// Whether the CLI records events in logs.duckdb
    pub event_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            event_logging: true,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}

fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment variables override the file:
    /// - REMITTANCE_DATABASE: account store file name
    /// - REMITTANCE_EVENT_LOGGING: true/false
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(data_dir)?;

        if let Some(database) = std::env::var("REMITTANCE_DATABASE")
            .ok()
            .filter(|d| !d.trim().is_empty())
        {
            config.database = database;
        }
        if let Some(enabled) = std::env::var("REMITTANCE_EVENT_LOGGING")
            .ok()
            .and_then(|v| parse_bool(&v))
        {
            config.event_logging = enabled;
        }

        Ok(config)
    }

    /// Load settings.json only, ignoring environment overrides
    ///
    /// This is what `save` should start from, so overrides never end up
    /// written to disk.
    pub fn load_file(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(&data_dir.join("settings.json"))?;
        let defaults = Self::default();

        Ok(Self {
            database: raw.app.database.unwrap_or(defaults.database),
            event_logging: raw.app.event_logging.unwrap_or(defaults.event_logging),
        })
    }

    /// Save config to the data directory, preserving keys it doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");
        let mut settings = read_settings(&settings_path)?;

        settings.app.database = Some(self.database.clone());
        settings.app.event_logging = Some(self.event_logging);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Absolute path of the account store
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database)
    }
}
