//! In-memory account store

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use crate::domain::{Account, AccountId};
use crate::ports::AccountStore;

/// Account store backed by a `HashMap`
///
/// Useful for tests and for embedding the transfer service without a
/// database. Nothing survives the process.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `accounts`
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let map = accounts.into_iter().map(|a| (a.id, a)).collect();
        Self {
            accounts: RwLock::new(map),
        }
    }

    /// All stored accounts, ordered by identifier
    pub fn accounts(&self) -> Result<Vec<Account>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by_key(|a| a.id);
        Ok(all)
    }
}

impl AccountStore for InMemoryAccountStore {
    fn load_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        Ok(accounts.get(&id).cloned())
    }

    fn persist(&self, account: &Account) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn persist_all(&self, batch: &[&Account]) -> Result<()> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        for account in batch {
            accounts.insert(account.id, (*account).clone());
        }
        Ok(())
    }
}
