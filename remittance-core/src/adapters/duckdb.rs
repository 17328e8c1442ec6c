//! DuckDB account store implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use duckdb::{params, Connection};

use crate::domain::{Account, AccountId};
use crate::ports::AccountStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const UPSERT_ACCOUNT_SQL: &str = "INSERT INTO sys_accounts (account_id, balance, updated_at)
     VALUES (?, ?, current_timestamp)
     ON CONFLICT (account_id) DO UPDATE
     SET balance = excluded.balance, updated_at = excluded.updated_at";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// DuckDB account store
pub struct DuckDbAccountStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbAccountStore {
    /// Open (or create) the store at `db_path`
    ///
    /// Retries with exponential backoff on file locking errors, which occur
    /// when another process holds the database file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[remittance] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Open an in-memory store, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading is off: nothing here needs extensions and cached
        // ones in ~/.duckdb/extensions can fail code signing checks
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(conn)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Run pending schema migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.connection()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// All accounts, ordered by identifier
    pub fn get_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT account_id, balance FROM sys_accounts ORDER BY account_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Account::new(row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut accounts = Vec::new();
        for account in rows {
            accounts.push(account?);
        }
        Ok(accounts)
    }

    /// Path of the database file (`:memory:` for in-memory stores)
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl AccountStore for DuckDbAccountStore {
    fn load_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT account_id, balance FROM sys_accounts WHERE account_id = ?")?;
        let mut rows = stmt.query(params![id.value()])?;

        match rows.next()? {
            Some(row) => Ok(Some(Account::new(
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
            ))),
            None => Ok(None),
        }
    }

    fn persist(&self, account: &Account) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            UPSERT_ACCOUNT_SQL,
            params![account.id.value(), account.balance],
        )?;
        Ok(())
    }

    /// Writes all accounts in a single transaction
    fn persist_all(&self, accounts: &[&Account]) -> Result<()> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        for account in accounts {
            tx.execute(
                UPSERT_ACCOUNT_SQL,
                params![account.id.value(), account.balance],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
