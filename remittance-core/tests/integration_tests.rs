//! Integration tests for remittance-core
//!
//! Transfers run against a real DuckDB file in a temp directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;
use tempfile::TempDir;

use remittance_core::adapters::duckdb::DuckDbAccountStore;
use remittance_core::{
    Account, AccountId, AccountStore, Error, ErrorKind, RemittanceContext, TransferService,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a store with schema initialized and the given accounts persisted
fn create_test_store(temp_dir: &TempDir, accounts: &[Account]) -> Arc<DuckDbAccountStore> {
    let db_path = temp_dir.path().join("test.duckdb");
    let store = DuckDbAccountStore::new(&db_path).expect("Failed to open store");
    store.ensure_schema().expect("Failed to initialize schema");
    for account in accounts {
        store.persist(account).expect("Failed to seed account");
    }
    Arc::new(store)
}

fn balance_of(store: &DuckDbAccountStore, id: i64) -> i64 {
    store
        .load_by_id(AccountId::new(id))
        .unwrap()
        .expect("account should exist")
        .balance
}

// ============================================================================
// Transfer by identifier
// ============================================================================

#[test]
fn test_transfer_by_ids_persists_new_balances() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir, &[Account::new(1, 500), Account::new(2, 500)]);
    let service = TransferService::new(Arc::clone(&store));

    service
        .transfer_by_ids(AccountId::new(1), AccountId::new(2), 250)
        .unwrap();

    assert_eq!(balance_of(&store, 1), 250);
    assert_eq!(balance_of(&store, 2), 750);
}

#[test]
fn test_transfer_by_ids_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = create_test_store(&temp_dir, &[Account::new(1, 100), Account::new(2, 0)]);
        let service = TransferService::new(store);
        service
            .transfer_by_ids(AccountId::new(1), AccountId::new(2), 40)
            .unwrap();
    }

    let store = DuckDbAccountStore::new(&temp_dir.path().join("test.duckdb")).unwrap();
    assert_eq!(
        store.get_accounts().unwrap(),
        vec![Account::new(1, 60), Account::new(2, 40)]
    );
}

#[test]
fn test_transfer_by_ids_unknown_account_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir, &[Account::new(1, 500)]);
    let service = TransferService::new(Arc::clone(&store));

    let err = service
        .transfer_by_ids(AccountId::new(1), AccountId::new(2), 250)
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(id) if id == AccountId::new(2)));
    assert_eq!(store.get_accounts().unwrap(), vec![Account::new(1, 500)]);
}

#[test]
fn test_failed_preconditions_leave_store_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(&temp_dir, &[Account::new(1, 1), Account::new(2, 2)]);
    let service = TransferService::new(Arc::clone(&store));

    let cases = [
        (1, 1, 1, ErrorKind::InvalidArgument),
        (1, 2, 0, ErrorKind::InvalidArgument),
        (1, 2, -3, ErrorKind::InvalidArgument),
        (1, 2, 2, ErrorKind::InsufficientFunds),
    ];
    for (from, to, amount, kind) in cases {
        let err = service
            .transfer_by_ids(AccountId::new(from), AccountId::new(to), amount)
            .unwrap_err();
        assert_eq!(err.kind(), kind, "transfer {} -> {} of {}", from, to, amount);
    }

    assert_eq!(
        store.get_accounts().unwrap(),
        vec![Account::new(1, 1), Account::new(2, 2)]
    );
}

#[test]
fn test_store_failure_propagates() {
    // No schema: every store call fails
    let store = DuckDbAccountStore::open_in_memory().unwrap();
    let service = TransferService::new(store);

    let err = service
        .transfer_by_ids(AccountId::new(1), AccountId::new(2), 1)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Store);
}

#[test]
fn test_chain_of_transfers_conserves_total() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store(
        &temp_dir,
        &[Account::new(1, 1000), Account::new(2, 0), Account::new(3, 0)],
    );
    let service = TransferService::new(Arc::clone(&store));

    service
        .transfer_by_ids(AccountId::new(1), AccountId::new(2), 600)
        .unwrap();
    service
        .transfer_by_ids(AccountId::new(2), AccountId::new(3), 250)
        .unwrap();
    service
        .transfer_by_ids(AccountId::new(3), AccountId::new(1), 50)
        .unwrap();

    let accounts = store.get_accounts().unwrap();
    assert_eq!(
        accounts,
        vec![Account::new(1, 450), Account::new(2, 350), Account::new(3, 200)]
    );
    assert_eq!(accounts.iter().map(|a| a.balance).sum::<i64>(), 1000);
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_context_uses_configured_database() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("settings.json"),
        r#"{"app": {"database": "ledger.duckdb"}}"#,
    )
    .unwrap();

    let ctx = RemittanceContext::new(temp_dir.path()).unwrap();
    ctx.store.persist(&Account::new(1, 10)).unwrap();
    ctx.store.persist(&Account::new(2, 0)).unwrap();
    ctx.transfer_service
        .transfer_by_ids(AccountId::new(1), AccountId::new(2), 10)
        .unwrap();

    assert!(temp_dir.path().join("ledger.duckdb").exists());
    assert_eq!(balance_of(&ctx.store, 1), 0);
    assert_eq!(balance_of(&ctx.store, 2), 10);
}
