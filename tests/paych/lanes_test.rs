// Lane Allocation Tests
// Tests for lane and nonce allocation on channel records

use num_bigint::BigInt;
use paych::chain::{MockChain, TipSetToken};
use paych::identity::Address;
use paych::storage::{ChannelStore, PAYMENT_CHANNEL_STORE_PREFIX};
use paych::voucher::SignedVoucher;
use paych::{ChannelInfo, Manager, ManagerConfig, PaychError};
use std::sync::Arc;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn setup() -> (ChannelStore, Manager) {
    let chain = Arc::new(MockChain::new());
    let store = ChannelStore::temporary(PAYMENT_CHANNEL_STORE_PREFIX).unwrap();
    let manager = Manager::new(
        store.clone(),
        chain.clone(),
        chain.clone(),
        chain,
        ManagerConfig::default(),
    )
    .unwrap();
    (store, manager)
}

fn seed_channel(store: &ChannelStore, seed: &str) -> Address {
    let addr = Address::new_actor(seed.as_bytes());
    let info = ChannelInfo::new(
        Address::new_actor(b"payer"),
        Address::new_actor(b"payee"),
        addr.clone(),
    );
    store.begin(&addr, &info).unwrap();
    addr
}

// ============================================================================
// ALLOCATION
// ============================================================================

#[test]
fn test_allocate_lane_missing_channel() {
    let (_, manager) = setup();
    let missing = Address::new_actor(b"missing");

    let result = manager.allocate_lane(&missing);

    assert!(matches!(result, Err(PaychError::NotFound(a)) if a == missing));
}

#[test]
fn test_allocate_lane_sequence() {
    let (store, manager) = setup();
    let paych = seed_channel(&store, "chan");

    assert_eq!(manager.allocate_lane(&paych).unwrap(), 0);
    assert_eq!(manager.allocate_lane(&paych).unwrap(), 1);
    assert_eq!(manager.allocate_lane(&paych).unwrap(), 2);

    let info = manager.get_payment_channel_info(&paych).unwrap();
    assert_eq!(info.next_lane(), 3);
    assert_eq!(info.next_nonce(), 4);
}

#[test]
fn test_allocate_lane_channels_independent() {
    let (store, manager) = setup();
    let a = seed_channel(&store, "a");
    let b = seed_channel(&store, "b");

    manager.allocate_lane(&a).unwrap();
    manager.allocate_lane(&a).unwrap();

    assert_eq!(manager.allocate_lane(&b).unwrap(), 0);
    assert_eq!(manager.get_payment_channel_info(&a).unwrap().next_lane(), 2);
}

#[test]
fn test_concurrent_allocation_has_no_gaps_or_duplicates() {
    let (store, manager) = setup();
    let paych = seed_channel(&store, "busy");
    manager.allocate_lane(&paych).unwrap();

    let mut lanes: Vec<u64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..32)
            .map(|_| s.spawn(|| manager.allocate_lane(&paych).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    lanes.sort_unstable();

    assert_eq!(lanes, (1..33).collect::<Vec<u64>>());
    let info = manager.get_payment_channel_info(&paych).unwrap();
    assert_eq!(info.next_lane(), 33);
    assert_eq!(info.next_nonce(), 34);
}

// ============================================================================
// MONOTONICITY
// ============================================================================

#[tokio::test]
async fn test_counters_never_decrease() {
    let (store, manager) = setup();
    let paych = seed_channel(&store, "mono");
    let mut last = manager.get_payment_channel_info(&paych).unwrap();

    for step in 0..10u64 {
        if step % 3 == 0 {
            manager.allocate_lane(&paych).unwrap();
        } else {
            let voucher = SignedVoucher::new(paych.clone(), 0, step, BigInt::from(step * 10));
            manager
                .add_voucher(&paych, &voucher, None, &BigInt::from(1000), &TipSetToken::default())
                .await
                .unwrap();
        }

        let current = manager.get_payment_channel_info(&paych).unwrap();
        assert!(current.next_lane() >= last.next_lane());
        assert_eq!(current.next_nonce(), last.next_nonce() + 1);
        last = current;
    }
}
