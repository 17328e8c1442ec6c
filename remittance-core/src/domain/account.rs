//! Account domain model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Opaque and comparable. Two accounts with equal identifiers are the same
/// account, whether or not they are the same value in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl AccountId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A financial account
///
/// Balance is held in minor currency units (e.g. cents), so there is no
/// fractional component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: i64,
}

impl Account {
    /// Create an account with an opening balance
    pub fn new(id: impl Into<AccountId>, balance: i64) -> Self {
        Self {
            id: id.into(),
            balance,
        }
    }

    /// True when `other` has the same identifier
    pub fn is_same_account(&self, other: &Account) -> bool {
        self.id == other.id
    }

    /// True when the balance covers `amount`
    pub fn has_funds_for(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}
