//! Event log - what each command did, kept in logs.duckdb
//!
//! A `remit` invocation records that it ran and, for transfers, whether the
//! transfer completed or which kind of error stopped it. Account
//! identifiers, balances and amounts are never written here; a store
//! failure keeps its message as `detail` since it names no account.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use duckdb::{Connection, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, ErrorKind};
use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

const TRANSFER_COMMAND: &str = "transfer";

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CommandExecuted,
    TransferCompleted,
    TransferFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CommandExecuted => "command_executed",
            EventKind::TransferCompleted => "transfer_completed",
            EventKind::TransferFailed => "transfer_failed",
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "command_executed" => Ok(EventKind::CommandExecuted),
            "transfer_completed" => Ok(EventKind::TransferCompleted),
            "transfer_failed" => Ok(EventKind::TransferFailed),
            other => Err(format!("Unknown event: {}", other)),
        }
    }
}

/// An event about to be recorded
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub kind: EventKind,
    pub command: String,
    pub error_kind: Option<ErrorKind>,
    pub detail: Option<String>,
}

impl LogEvent {
    /// A CLI command started
    pub fn command_executed(command: impl Into<String>) -> Self {
        Self {
            kind: EventKind::CommandExecuted,
            command: command.into(),
            error_kind: None,
            detail: None,
        }
    }

    pub fn transfer_completed() -> Self {
        Self {
            kind: EventKind::TransferCompleted,
            command: TRANSFER_COMMAND.to_string(),
            error_kind: None,
            detail: None,
        }
    }

    /// A transfer was rejected or could not be stored
    ///
    /// Business errors are reduced to their kind: their messages name
    /// accounts and amounts.
    pub fn transfer_failed(err: &Error) -> Self {
        let detail = match err {
            Error::Store(e) => Some(e.to_string()),
            _ => None,
        };
        Self {
            kind: EventKind::TransferFailed,
            command: TRANSFER_COMMAND.to_string(),
            error_kind: Some(err.kind()),
            detail,
        }
    }
}

/// A stored event
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub id: i64,
    /// Unix milliseconds
    pub recorded_at: i64,
    pub app_version: String,
    pub event: EventKind,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Which events `LoggingService::recent` returns
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub limit: usize,
    /// Only `transfer_failed` events
    pub failures_only: bool,
    /// Only failures of this kind (implies `failures_only`)
    pub error_kind: Option<ErrorKind>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            limit: 50,
            failures_only: false,
            error_kind: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureCount {
    pub kind: ErrorKind,
    pub count: u64,
}

/// Transfer outcomes across the whole log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferSummary {
    pub completed: u64,
    /// Failures grouped by error kind, most frequent first
    pub failed: Vec<FailureCount>,
}

impl TransferSummary {
    pub fn failed_total(&self) -> u64 {
        self.failed.iter().map(|f| f.count).sum()
    }
}

type EventRow = (
    i64,
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
);

fn into_record(row: EventRow) -> Result<EventRecord> {
    let (id, recorded_at, app_version, event, command, error_kind, detail) = row;
    Ok(EventRecord {
        id,
        recorded_at,
        app_version,
        event: event.parse().map_err(|e: String| anyhow!(e))?,
        command,
        error_kind: error_kind
            .map(|k| k.parse().map_err(|e: String| anyhow!(e)))
            .transpose()?,
        detail,
    })
}

/// Records and queries the event log
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    app_version: String,
}

impl LoggingService {
    /// Open or create logs.duckdb in `data_dir` and run pending migrations
    pub fn new(data_dir: &Path, app_version: impl Into<String>) -> Result<Self> {
        let db_path = data_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;
        MigrationService::with_migrations(&conn, LOG_MIGRATIONS).run_pending()?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            app_version: app_version.into(),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    pub fn record(&self, event: &LogEvent) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO sys_events (recorded_at, app_version, event, command, error_kind, detail)
             VALUES (?, ?, ?, ?, ?, ?)",
            duckdb::params![
                now_ms(),
                &self.app_version,
                event.kind.as_str(),
                &event.command,
                event.error_kind.map(|k| k.as_str()),
                &event.detail,
            ],
        )?;
        Ok(())
    }

    /// Events matching `filter`, newest first
    pub fn recent(&self, filter: &EventFilter) -> Result<Vec<EventRecord>> {
        let kind = filter.error_kind.map(|k| k.as_str());
        let mut clauses = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();

        if filter.failures_only || kind.is_some() {
            clauses.push("event = 'transfer_failed'");
        }
        if let Some(kind) = &kind {
            clauses.push("error_kind = ?");
            params.push(kind);
        }

        let mut sql = String::from(
            "SELECT id, recorded_at, app_version, event, command, error_kind, detail
             FROM sys_events",
        );
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY id DESC LIMIT {}", filter.limit));

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params.as_slice(), |row| -> duckdb::Result<EventRow> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?;

        let records: Result<Vec<EventRecord>> = rows.map(|row| into_record(row?)).collect();
        records
    }

    /// Completed transfers and failures per error kind
    pub fn transfer_summary(&self) -> Result<TransferSummary> {
        let conn = self.connection()?;
        let completed: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_events WHERE event = 'transfer_completed'",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT error_kind, COUNT(*) AS n FROM sys_events
             WHERE event = 'transfer_failed' AND error_kind IS NOT NULL
             GROUP BY error_kind
             ORDER BY n DESC, error_kind",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut failed = Vec::new();
        for row in rows {
            let (kind, count) = row?;
            failed.push(FailureCount {
                kind: kind.parse().map_err(|e: String| anyhow!(e))?,
                count: count as u64,
            });
        }

        Ok(TransferSummary {
            completed: completed as u64,
            failed,
        })
    }

    /// Number of stored events of any kind
    pub fn event_count(&self) -> Result<u64> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_events", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Delete events older than `age`, returning how many went
    pub fn prune_older_than(&self, age: Duration) -> Result<u64> {
        let age_ms = i64::try_from(age.as_millis()).unwrap_or(i64::MAX);
        self.delete_recorded_before(now_ms().saturating_sub(age_ms))
    }

    fn delete_recorded_before(&self, cutoff_ms: i64) -> Result<u64> {
        let conn = self.connection()?;
        let deleted = conn.execute("DELETE FROM sys_events WHERE recorded_at < ?", [cutoff_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
