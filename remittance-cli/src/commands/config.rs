//! Config command - show and change settings.json

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use remittance_core::config::Config;

use super::get_data_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings, including environment overrides
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write settings to settings.json
    Set {
        /// Account store file, relative to the data directory
        #[arg(long)]
        database: Option<String>,
        /// Record command events in logs.duckdb
        #[arg(long)]
        event_logging: Option<bool>,
    },
}

/// Apply the requested changes; at least one must be given
fn apply(
    config: &mut Config,
    database: Option<String>,
    event_logging: Option<bool>,
) -> Result<()> {
    if database.is_none() && event_logging.is_none() {
        bail!("Nothing to set; pass --database or --event-logging");
    }
    if let Some(database) = database {
        let database = database.trim();
        if database.is_empty() {
            bail!("The database file name must not be empty");
        }
        config.database = database.to_string();
    }
    if let Some(enabled) = event_logging {
        config.event_logging = enabled;
    }
    Ok(())
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let data_dir = get_data_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&data_dir)?;
            let database_path = config.database_path(&data_dir);

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "data_dir": data_dir.to_string_lossy(),
                        "database": config.database,
                        "database_path": database_path.to_string_lossy(),
                        "event_logging": config.event_logging,
                    })
                );
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Setting", "Value"]);
            table.add_row(vec!["Data directory".to_string(), data_dir.display().to_string()]);
            table.add_row(vec!["Account store".to_string(), database_path.display().to_string()]);
            table.add_row(vec!["Event logging".to_string(), config.event_logging.to_string()]);
            println!("{}", table);
            println!(
                "{}",
                "REMITTANCE_DATABASE and REMITTANCE_EVENT_LOGGING override these values".dimmed()
            );
        }
        ConfigCommands::Set {
            database,
            event_logging,
        } => {
            std::fs::create_dir_all(&data_dir)?;
            let mut config = Config::load_file(&data_dir)?;
            apply(&mut config, database, event_logging)?;
            config.save(&data_dir)?;
            output::success(&format!("Saved {}", data_dir.join("settings.json").display()));
        }
    }

    Ok(())
}
