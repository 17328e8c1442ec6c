//! Logs command - inspect transfer outcomes recorded in logs.duckdb

use std::time::Duration;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;

use remittance_core::services::logging::{EventKind, EventRecord, TransferSummary};
use remittance_core::{ErrorKind, EventFilter, LoggingService};

use super::get_data_dir;
use crate::output;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        /// Number of events to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only failed transfers
        #[arg(long)]
        failures: bool,
        /// Only failed transfers of this kind (e.g. insufficient_funds, not_found)
        #[arg(long)]
        kind: Option<ErrorKind>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count completed transfers and failures per error kind
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old events
    Clear {
        /// Delete events older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    LoggingService::new(&data_dir, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

/// Table cell for what an event means for the transfer
fn outcome_cell(record: &EventRecord) -> String {
    match (record.event, record.error_kind) {
        (EventKind::TransferCompleted, _) => "completed".green().to_string(),
        (EventKind::TransferFailed, Some(kind)) => kind.as_str().red().to_string(),
        (EventKind::TransferFailed, None) => "failed".red().to_string(),
        (EventKind::CommandExecuted, _) => "started".dimmed().to_string(),
    }
}

fn print_events(records: Vec<EventRecord>) {
    if records.is_empty() {
        println!("No matching events.");
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time (UTC)", "Command", "Outcome", "Detail"]);
    for record in &records {
        table.add_row(vec![
            format_timestamp(record.recorded_at),
            record.command.clone(),
            outcome_cell(record),
            record.detail.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
}

fn print_summary(summary: &TransferSummary) {
    let attempts = summary.completed + summary.failed_total();
    println!("{}", "Transfers".bold());
    println!("  Attempted: {}", attempts);
    println!("  Completed: {}", summary.completed.to_string().green());
    println!("  Failed:    {}", summary.failed_total().to_string().red());

    if summary.failed.is_empty() {
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Failure kind", "Count"]);
    for failure in &summary.failed {
        table.add_row(vec![failure.kind.as_str().to_string(), failure.count.to_string()]);
    }
    println!("{}", table);
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List {
            limit,
            failures,
            kind,
            json,
        } => {
            let log = open_log()?;
            let records = log.recent(&EventFilter {
                limit,
                failures_only: failures,
                error_kind: kind,
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_events(records);
            }
        }
        LogsCommands::Stats { json } => {
            let log = open_log()?;
            let summary = log.transfer_summary()?;

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "transfers": summary,
                        "events": log.event_count()?,
                        "database_path": log.db_path().to_string_lossy(),
                    })
                );
            } else {
                print_summary(&summary);
                println!("{}", format!("Event log: {}", log.db_path().display()).dimmed());
            }
        }
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => {
            let log = open_log()?;

            if !force && !json {
                use dialoguer::Confirm;
                if !Confirm::new()
                    .with_prompt(format!("Delete events older than {} days?", older_than_days))
                    .default(false)
                    .interact()?
                {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let age = Duration::from_secs(older_than_days.saturating_mul(SECS_PER_DAY));
            let deleted = log.prune_older_than(age)?;

            if json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else {
                output::success(&format!("Deleted {} events", deleted));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(event: EventKind, error_kind: Option<ErrorKind>) -> EventRecord {
        EventRecord {
            id: 1,
            recorded_at: 0,
            app_version: "0.1.0".to_string(),
            event,
            command: "transfer".to_string(),
            error_kind,
            detail: None,
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(86_400_000), "1970-01-02 00:00:00");
    }

    #[test]
    fn test_outcome_cell_names_the_failure_kind() {
        colored::control::set_override(false);

        let failed = record(EventKind::TransferFailed, Some(ErrorKind::InsufficientFunds));
        assert_eq!(outcome_cell(&failed), "insufficient_funds");
        assert_eq!(outcome_cell(&record(EventKind::TransferCompleted, None)), "completed");
        assert_eq!(outcome_cell(&record(EventKind::CommandExecuted, None)), "started");
    }
}
