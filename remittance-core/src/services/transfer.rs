//! Transfer service - moves money between two accounts

use std::sync::Mutex;

use anyhow::anyhow;

use crate::domain::{Account, AccountId, Error, Result};
use crate::ports::AccountStore;

/// Transfer service
///
/// Two entry points share one validated mutation: `transfer` works on
/// accounts the caller already holds, `transfer_by_ids` loads them from the
/// store and persists them afterwards.
pub struct TransferService<S: AccountStore> {
    store: S,
    // Serializes load -> mutate -> persist for by-id transfers
    by_id_lock: Mutex<()>,
}

impl<S: AccountStore> TransferService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            by_id_lock: Mutex::new(()),
        }
    }

    /// The store this service loads from and persists to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Transfer `amount` from `sender` to `recipient`
    ///
    /// Checks run in a fixed order and the balances are only touched once
    /// every check has passed:
    /// 1. sender present
    /// 2. recipient present
    /// 3. different account identifiers
    /// 4. amount greater than zero
    /// 5. sender balance covers the amount
    ///
    /// Nothing is persisted; the caller owns both accounts and decides
    /// whether to store them.
    pub fn transfer(
        &self,
        sender: Option<&mut Account>,
        recipient: Option<&mut Account>,
        amount: i64,
    ) -> Result<()> {
        let sender =
            sender.ok_or_else(|| Error::null_reference("The sender account must not be null"))?;
        let recipient = recipient
            .ok_or_else(|| Error::null_reference("The recipient account must not be null"))?;

        apply_transfer(sender, recipient, amount)
    }

    /// Transfer `amount` between two stored accounts
    ///
    /// Fails with `NotFound` for an unknown identifier before anything is
    /// persisted. On success both accounts are persisted, sender first,
    /// before returning. Store errors are returned as-is; the loaded copies
    /// are not rolled back if persisting fails.
    pub fn transfer_by_ids(
        &self,
        sender_id: AccountId,
        recipient_id: AccountId,
        amount: i64,
    ) -> Result<()> {
        let _guard = self
            .by_id_lock
            .lock()
            .map_err(|e| Error::store(anyhow!("Lock poisoned: {}", e)))?;

        let mut sender = self.load(sender_id)?;
        let mut recipient = self.load(recipient_id)?;

        apply_transfer(&mut sender, &mut recipient, amount)?;

        self.store
            .persist_all(&[&sender, &recipient])
            .map_err(Error::store)
    }

    fn load(&self, id: AccountId) -> Result<Account> {
        self.store
            .load_by_id(id)
            .map_err(Error::store)?
            .ok_or(Error::NotFound(id))
    }
}

/// Validate and apply a transfer between two present accounts
fn apply_transfer(sender: &mut Account, recipient: &mut Account, amount: i64) -> Result<()> {
    if sender.is_same_account(recipient) {
        return Err(Error::invalid_argument(format!(
            "The same account: {}",
            sender.id
        )));
    }
    if amount <= 0 {
        return Err(Error::invalid_argument(format!(
            "The amount must be positive and greater than zero: {}",
            amount
        )));
    }
    if !sender.has_funds_for(amount) {
        return Err(Error::InsufficientFunds {
            account: sender.id,
            balance: sender.balance,
            requested: amount,
        });
    }
    let credited = recipient.balance.checked_add(amount).ok_or_else(|| {
        Error::invalid_argument(format!(
            "The recipient balance would overflow: {}",
            recipient.id
        ))
    })?;

    // amount <= sender.balance, so this cannot underflow
    sender.balance -= amount;
    recipient.balance = credited;
    Ok(())
}
