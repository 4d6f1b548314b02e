//! Integration test: end-to-end lock/claim/reclaim scenarios.
//!
//! Drives the bond and token controllers together with the registry, the
//! in-memory ledger and the event bus, the way a caller exchanging assets
//! would.

use std::sync::{Arc, Barrier};
use std::time::Duration;

use assetlock_core::{AssetKey, HtlcStatus};
use assetlock_crypto::commit;
use assetlock_htlc::{AssetLedger, EventKind, HtlcError, ManualClock};
use assetlock_integration_tests::{locker, recipient, Harness, BOND_TYPE, TOKEN_TYPE};

const NOW: u64 = 1_700_000_000;

// =========================================================================
// Bond lock then claim
// =========================================================================

#[tokio::test]
async fn test_bond_lock_and_claim() {
    let h = Harness::system().unwrap();
    h.bond("a1", &locker()).unwrap();
    let mut events = h.bus.subscribe();

    let receipt = h
        .bonds
        .lock(BOND_TYPE, "a1", &locker(), &recipient(), &commit(b"abcd"), h.now() + 600)
        .unwrap();
    let lock_event = events
        .wait_for(EventKind::LockAsset, Duration::from_secs(20))
        .await
        .expect("lock event");
    assert_eq!(lock_event.contract_id, *receipt.contract_id());
    assert!(h
        .bonds
        .is_locked_by_asset(BOND_TYPE, "a1", &locker(), &recipient())
        .unwrap()
        .locked);

    h.bonds
        .claim_by_asset(BOND_TYPE, "a1", &locker(), &recipient(), b"abcd")
        .unwrap();
    let claim_event = events
        .wait_for(EventKind::ClaimAsset, Duration::from_secs(20))
        .await
        .expect("claim event");
    assert_eq!(claim_event.record.status, HtlcStatus::Claimed);

    let asset = h.ledger.read_asset(&AssetKey::new(BOND_TYPE, "a1")).unwrap();
    assert_eq!(asset.owner, recipient());
    assert!(!asset.locked);
    assert!(!h
        .bonds
        .is_locked_by_asset(BOND_TYPE, "a1", &locker(), &recipient())
        .unwrap()
        .locked);
}

// =========================================================================
// Bond lock, let it lapse, reclaim (real time)
// =========================================================================

#[tokio::test]
async fn test_bond_lock_expire_and_reclaim() {
    let h = Harness::system().unwrap();
    h.bond("a2", &locker()).unwrap();
    let mut events = h.bus.subscribe();

    let receipt = h
        .bonds
        .lock(BOND_TYPE, "a2", &locker(), &recipient(), &commit(b"abcd"), h.now() + 1)
        .unwrap();
    let id = receipt.contract_id().clone();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!h.bonds.is_locked(&id).unwrap().locked);

    h.bonds.reclaim(&id, &locker()).unwrap();
    assert!(events
        .wait_for(EventKind::UnlockAsset, Duration::from_secs(20))
        .await
        .is_some());

    let result = h.bonds.claim(&id, &recipient(), b"abcd");
    assert!(matches!(
        result,
        Err(HtlcError::InvalidState {
            status: HtlcStatus::Reclaimed,
            ..
        })
    ));

    let asset = h.ledger.read_asset(&AssetKey::new(BOND_TYPE, "a2")).unwrap();
    assert_eq!(asset.owner, locker());
    assert!(!asset.locked);
}

// =========================================================================
// Tokens: wrong preimage, then the right one
// =========================================================================

#[test]
fn test_token_bad_preimage_then_claim() {
    let h = Harness::system().unwrap();
    h.issue(&locker(), 6).unwrap();

    let receipt = h
        .tokens
        .lock(TOKEN_TYPE, 5, &locker(), &recipient(), &commit(b"abcd"), h.now() + 600)
        .unwrap();
    let id = receipt.contract_id();
    let before = (
        h.ledger.balance(TOKEN_TYPE, &locker()).unwrap(),
        h.ledger.balance(TOKEN_TYPE, &recipient()).unwrap(),
    );
    assert_eq!(before, (1, 0));

    assert!(matches!(
        h.tokens.claim(id, &recipient(), b"wrong"),
        Err(HtlcError::BadPreimage(_))
    ));
    assert_eq!(h.ledger.balance(TOKEN_TYPE, &locker()).unwrap(), 1);
    assert_eq!(h.ledger.balance(TOKEN_TYPE, &recipient()).unwrap(), 0);

    h.tokens.claim(id, &recipient(), b"abcd").unwrap();
    assert_eq!(h.ledger.balance(TOKEN_TYPE, &recipient()).unwrap(), 5);
    assert_eq!(h.ledger.balance(TOKEN_TYPE, &locker()).unwrap(), 1);
}

// =========================================================================
// Concurrent reclaim of one expired lock
// =========================================================================

#[test]
fn test_concurrent_reclaims_exactly_one_wins() {
    let clock = Arc::new(ManualClock::new(NOW));
    let h = Arc::new(Harness::manual(clock.clone()).unwrap());
    h.issue(&locker(), 10).unwrap();

    let receipt = h
        .tokens
        .lock(TOKEN_TYPE, 5, &locker(), &recipient(), &commit(b"abcd"), NOW + 60)
        .unwrap();
    let id = receipt.contract_id().clone();
    clock.advance(61);

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let h = Arc::clone(&h);
            let barrier = Arc::clone(&barrier);
            let id = id.clone();
            std::thread::spawn(move || {
                barrier.wait();
                h.tokens.reclaim(&id, &locker())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|t| t.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(HtlcError::InvalidState { .. })))
            .count(),
        1
    );
    assert_eq!(h.ledger.balance(TOKEN_TYPE, &locker()).unwrap(), 10);
}

#[test]
fn test_reclaim_at_deadline_is_final() {
    let clock = Arc::new(ManualClock::new(NOW));
    let h = Harness::manual(clock.clone()).unwrap();
    h.bond("a3", &locker()).unwrap();

    let receipt = h
        .bonds
        .lock(BOND_TYPE, "a3", &locker(), &recipient(), &commit(b"abcd"), NOW + 60)
        .unwrap();
    let id = receipt.contract_id().clone();
    clock.advance(60);

    // At the deadline only reclaim is admissible.
    h.bonds.reclaim(&id, &locker()).unwrap();
    assert!(matches!(
        h.bonds.claim(&id, &recipient(), b"abcd"),
        Err(HtlcError::InvalidState { .. })
    ));
    assert!(matches!(
        h.bonds.reclaim(&id, &locker()),
        Err(HtlcError::InvalidState { .. })
    ));
    assert_eq!(h.registry.active_count(), 0);
}
