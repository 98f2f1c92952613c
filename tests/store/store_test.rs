// Store Tests
// Tests for the sled-backed channel record store

use paych::identity::Address;
use paych::storage::{ChannelStore, StoreError, PAYMENT_CHANNEL_STORE_PREFIX};
use paych::ChannelInfo;
use tempfile::TempDir;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn temp_store() -> ChannelStore {
    ChannelStore::temporary(PAYMENT_CHANNEL_STORE_PREFIX).unwrap()
}

fn channel_record(seed: &str) -> (Address, ChannelInfo) {
    let addr = Address::new_actor(seed.as_bytes());
    let info = ChannelInfo::new(
        Address::new_actor(format!("{}-payer", seed).as_bytes()),
        Address::new_actor(format!("{}-payee", seed).as_bytes()),
        addr.clone(),
    );
    (addr, info)
}

// ============================================================================
// BASIC OPERATIONS
// ============================================================================

#[test]
fn test_store_open_new() {
    let temp_dir = TempDir::new().unwrap();
    let store = ChannelStore::open(temp_dir.path(), PAYMENT_CHANNEL_STORE_PREFIX).unwrap();

    assert!(store.is_empty());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_store_get_nonexistent() {
    let store = temp_store();
    let (addr, _) = channel_record("missing");

    assert!(matches!(store.get(&addr), Err(StoreError::NotFound(a)) if a == addr));
    assert!(!store.has(&addr).unwrap());
}

#[test]
fn test_store_begin_twice_fails() {
    let store = temp_store();
    let (addr, info) = channel_record("chan");

    store.begin(&addr, &info).unwrap();
    let result = store.begin(&addr, &info);

    assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_store_list_returns_all_records() {
    let store = temp_store();
    for seed in ["a", "b", "c"] {
        let (addr, info) = channel_record(seed);
        store.begin(&addr, &info).unwrap();
    }

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 3);
    for seed in ["a", "b", "c"] {
        let (addr, _) = channel_record(seed);
        assert!(listed.iter().any(|info| info.unique_addr() == &addr));
    }
}

// ============================================================================
// MUTATION
// ============================================================================

#[test]
fn test_store_mutate_missing_record() {
    let store = temp_store();
    let (addr, _) = channel_record("missing");

    let result: Result<u64, StoreError> = store.mutate(&addr, |info| Ok(info.allocate_lane()));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert!(!store.has(&addr).unwrap());
}

#[test]
fn test_store_mutate_persists() {
    let store = temp_store();
    let (addr, info) = channel_record("chan");
    store.begin(&addr, &info).unwrap();

    let lane: u64 = store
        .mutate(&addr, |info| Ok::<_, StoreError>(info.allocate_lane()))
        .unwrap();

    assert_eq!(lane, 0);
    let stored = store.get(&addr).unwrap();
    assert_eq!(stored.next_lane(), 1);
    assert_eq!(stored.next_nonce(), 2);
}

#[test]
fn test_store_concurrent_mutations_not_lost() {
    let store = temp_store();
    let (addr, info) = channel_record("busy");
    store.begin(&addr, &info).unwrap();

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..50 {
                    store
                        .mutate(&addr, |info| Ok::<_, StoreError>(info.allocate_lane()))
                        .unwrap();
                }
            });
        }
    });

    let stored = store.get(&addr).unwrap();
    assert_eq!(stored.next_lane(), 400);
    assert_eq!(stored.next_nonce(), 401);
}

#[test]
fn test_store_mutations_on_different_keys_are_independent() {
    let store = temp_store();
    let (a, info_a) = channel_record("a");
    let (b, info_b) = channel_record("b");
    store.begin(&a, &info_a).unwrap();
    store.begin(&b, &info_b).unwrap();

    store
        .mutate(&a, |info| Ok::<_, StoreError>(info.allocate_lane()))
        .unwrap();

    assert_eq!(store.get(&a).unwrap().next_lane(), 1);
    assert_eq!(store.get(&b).unwrap(), info_b);
}

// ============================================================================
// PERSISTENCE AND NAMESPACES
// ============================================================================

#[test]
fn test_store_reopen_keeps_records() {
    let temp_dir = TempDir::new().unwrap();
    let (addr, info) = channel_record("durable");

    {
        let store = ChannelStore::open(temp_dir.path(), PAYMENT_CHANNEL_STORE_PREFIX).unwrap();
        store.begin(&addr, &info).unwrap();
        store
            .mutate(&addr, |info| Ok::<_, StoreError>(info.allocate_lane()))
            .unwrap();
        store.flush().unwrap();
    }

    {
        let store = ChannelStore::open(temp_dir.path(), PAYMENT_CHANNEL_STORE_PREFIX).unwrap();
        let stored = store.get(&addr).unwrap();
        assert_eq!(stored.next_lane(), 1);
        assert_eq!(stored.from(), info.from());
    }
}

#[test]
fn test_store_namespaces_are_isolated() {
    let db = sled::Config::new().temporary(true).open().unwrap();
    let first = ChannelStore::with_db(db.clone(), PAYMENT_CHANNEL_STORE_PREFIX).unwrap();
    let second = ChannelStore::with_db(db, "/other/namespace").unwrap();

    let (addr, info) = channel_record("chan");
    first.begin(&addr, &info).unwrap();

    assert!(first.has(&addr).unwrap());
    assert!(!second.has(&addr).unwrap());
}
