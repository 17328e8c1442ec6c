//! Account store port - account lookup and persistence

use anyhow::Result;

use crate::domain::{Account, AccountId};

/// Account store abstraction
///
/// The transfer service depends only on this trait. Errors returned here
/// are infrastructure failures and reach the caller unmodified; an unknown
/// identifier is `Ok(None)`, not an error.
pub trait AccountStore: Send + Sync {
    /// Load an account by identifier
    fn load_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    /// Persist an account (insert or update)
    fn persist(&self, account: &Account) -> Result<()>;

    /// Persist several accounts, in order
    ///
    /// Stores that support batch writes override this to write all accounts
    /// in one unit.
    fn persist_all(&self, accounts: &[&Account]) -> Result<()> {
        for account in accounts {
            self.persist(account)?;
        }
        Ok(())
    }
}

impl<S: AccountStore + ?Sized> AccountStore for std::sync::Arc<S> {
    fn load_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        (**self).load_by_id(id)
    }

    fn persist(&self, account: &Account) -> Result<()> {
        (**self).persist(account)
    }

    fn persist_all(&self, accounts: &[&Account]) -> Result<()> {
        (**self).persist_all(accounts)
    }
}
