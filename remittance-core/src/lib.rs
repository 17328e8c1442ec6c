//! Remittance Core - money transfers between accounts
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Account entity and error types
//! - **ports**: the AccountStore trait the transfer logic depends on
//! - **services**: transfer operation, migrations, event logging
//! - **adapters**: concrete stores (DuckDB, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbAccountStore;
use config::Config;

// Re-export commonly used types at crate root
pub use domain::{Account, AccountId, Error, ErrorKind, OperationResult};
pub use ports::AccountStore;
pub use services::{EventFilter, LogEvent, LoggingService, TransferService};

/// Main context for remittance operations
///
/// Holds the configuration, the DuckDB account store and the transfer
/// service wired to it.
pub struct RemittanceContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub store: Arc<DuckDbAccountStore>,
    pub transfer_service: TransferService<Arc<DuckDbAccountStore>>,
}

impl RemittanceContext {
    /// Open the context rooted at `data_dir`
    ///
    /// Loads settings.json, opens the configured account store and applies
    /// pending migrations.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let store = Arc::new(DuckDbAccountStore::new(&config.database_path(data_dir))?);
        store.ensure_schema()?;

        let transfer_service = TransferService::new(Arc::clone(&store));

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            store,
            transfer_service,
        })
    }
}
