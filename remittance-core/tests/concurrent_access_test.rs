//! Concurrent transfer tests
//!
//! Many threads share one TransferService and move money between the same
//! accounts. Every by-id transfer loads, mutates and persists under the
//! service's lock, so no update may be lost.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

use remittance_core::adapters::duckdb::DuckDbAccountStore;
use remittance_core::adapters::memory::InMemoryAccountStore;
use remittance_core::{Account, AccountId, AccountStore, ErrorKind, TransferService};

/// Number of concurrent threads
const THREAD_COUNT: usize = 8;

/// Transfers per thread
const ITERATIONS_PER_THREAD: usize = 25;

/// Run THREAD_COUNT threads, each moving 1 unit from account 1 to account 2
/// ITERATIONS_PER_THREAD times. Returns (successes, insufficient funds).
fn hammer<S: AccountStore + 'static>(service: Arc<TransferService<S>>) -> (usize, usize) {
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let successes = Arc::new(AtomicUsize::new(0));
    let insufficient = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let service = Arc::clone(&service);
            let successes = Arc::clone(&successes);
            let insufficient = Arc::clone(&insufficient);

            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ITERATIONS_PER_THREAD {
                    match service.transfer_by_ids(AccountId::new(1), AccountId::new(2), 1) {
                        Ok(()) => {
                            successes.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) if e.kind() == ErrorKind::InsufficientFunds => {
                            insufficient.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => panic!("unexpected transfer error: {}", e),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    (
        successes.load(Ordering::SeqCst),
        insufficient.load(Ordering::SeqCst),
    )
}

#[test]
fn test_concurrent_transfers_in_memory_conserve_total() {
    let total = (THREAD_COUNT * ITERATIONS_PER_THREAD) as i64;
    let store = InMemoryAccountStore::with_accounts([Account::new(1, total), Account::new(2, 0)]);
    let service = Arc::new(TransferService::new(store));

    let (successes, insufficient) = hammer(Arc::clone(&service));

    assert_eq!(successes, THREAD_COUNT * ITERATIONS_PER_THREAD);
    assert_eq!(insufficient, 0);
    assert_eq!(
        service.store().accounts().unwrap(),
        vec![Account::new(1, 0), Account::new(2, total)]
    );
}

#[test]
fn test_concurrent_transfers_stop_at_zero_balance() {
    // Only half the requested transfers can be funded
    let funded = (THREAD_COUNT * ITERATIONS_PER_THREAD / 2) as i64;
    let store = InMemoryAccountStore::with_accounts([Account::new(1, funded), Account::new(2, 0)]);
    let service = Arc::new(TransferService::new(store));

    let (successes, insufficient) = hammer(Arc::clone(&service));

    assert_eq!(successes as i64, funded);
    assert_eq!(successes + insufficient, THREAD_COUNT * ITERATIONS_PER_THREAD);
    assert_eq!(
        service.store().accounts().unwrap(),
        vec![Account::new(1, 0), Account::new(2, funded)]
    );
}

#[test]
fn test_concurrent_transfers_duckdb_conserve_total() {
    let temp_dir = TempDir::new().unwrap();
    let store = DuckDbAccountStore::new(&temp_dir.path().join("concurrent.duckdb")).unwrap();
    store.ensure_schema().unwrap();

    let total = (THREAD_COUNT * ITERATIONS_PER_THREAD) as i64;
    store.persist(&Account::new(1, total)).unwrap();
    store.persist(&Account::new(2, 0)).unwrap();

    let service = Arc::new(TransferService::new(store));
    let (successes, _) = hammer(Arc::clone(&service));

    assert_eq!(successes, THREAD_COUNT * ITERATIONS_PER_THREAD);
    let accounts = service.store().get_accounts().unwrap();
    assert_eq!(accounts, vec![Account::new(1, 0), Account::new(2, total)]);
}
