//! Integration test: token value is neither created nor destroyed.
//!
//! Runs mixed lock/claim/reclaim sequences, including ones that fail part
//! way through, and checks the locker + recipient total after each step.

use std::sync::Arc;

use assetlock_core::Identity;
use assetlock_crypto::commit;
use assetlock_htlc::{AssetLedger, HtlcError, LedgerOp, ManualClock};
use assetlock_integration_tests::{locker, recipient, Harness, TOKEN_TYPE};

const NOW: u64 = 1_700_000_000;

fn total(h: &Harness) -> u64 {
    balance(h, &locker()) + balance(h, &recipient())
}

fn balance(h: &Harness, who: &Identity) -> u64 {
    h.ledger.balance(TOKEN_TYPE, who).unwrap()
}

/// Escrowed units still held by `Locked` records.
fn escrowed(h: &Harness) -> u64 {
    h.registry
        .records()
        .iter()
        .filter(|r| r.status == assetlock_core::HtlcStatus::Locked)
        .filter_map(|r| r.asset.quantity())
        .sum()
}

#[test]
fn test_lock_claim_conserves_total() {
    let h = Harness::manual(Arc::new(ManualClock::new(NOW))).unwrap();
    h.issue(&locker(), 20).unwrap();
    h.issue(&recipient(), 3).unwrap();
    let before = total(&h);

    let receipt = h
        .tokens
        .lock(TOKEN_TYPE, 7, &locker(), &recipient(), &commit(b"abcd"), NOW + 600)
        .unwrap();
    assert_eq!(total(&h) + escrowed(&h), before);

    h.tokens
        .claim(receipt.contract_id(), &recipient(), b"abcd")
        .unwrap();
    assert_eq!(total(&h), before);
    assert_eq!(balance(&h, &recipient()), 10);
}

#[test]
fn test_lock_reclaim_conserves_total() {
    let clock = Arc::new(ManualClock::new(NOW));
    let h = Harness::manual(clock.clone()).unwrap();
    h.issue(&locker(), 20).unwrap();
    let before = total(&h);

    let receipt = h
        .tokens
        .lock(TOKEN_TYPE, 7, &locker(), &recipient(), &commit(b"abcd"), NOW + 10)
        .unwrap();
    clock.advance(10);
    h.tokens.reclaim(receipt.contract_id(), &locker()).unwrap();

    assert_eq!(total(&h), before);
    assert_eq!(balance(&h, &locker()), 20);
}

#[test]
fn test_interleaved_locks_conserve_total() {
    let clock = Arc::new(ManualClock::new(NOW));
    let h = Harness::manual(clock.clone()).unwrap();
    h.issue(&locker(), 50).unwrap();
    let before = total(&h);

    let mut ids = Vec::new();
    for (units, secs) in [(5, 100), (10, 20), (15, 100), (20, 20)] {
        let receipt = h
            .tokens
            .lock(TOKEN_TYPE, units, &locker(), &recipient(), &commit(b"abcd"), NOW + secs)
            .unwrap();
        ids.push(receipt.contract_id().clone());
        assert_eq!(total(&h) + escrowed(&h), before);
    }
    assert_eq!(balance(&h, &locker()), 0);
    assert!(matches!(
        h.tokens
            .lock(TOKEN_TYPE, 1, &locker(), &recipient(), &commit(b"abcd"), NOW + 100),
        Err(HtlcError::InsufficientBalance { .. })
    ));

    clock.advance(20);
    // Short locks have lapsed; long ones are still claimable.
    h.tokens.claim(&ids[0], &recipient(), b"abcd").unwrap();
    h.tokens.reclaim(&ids[1], &locker()).unwrap();
    h.tokens.claim(&ids[2], &recipient(), b"abcd").unwrap();
    assert!(matches!(
        h.tokens.claim(&ids[3], &recipient(), b"abcd"),
        Err(HtlcError::Expired(_))
    ));
    h.tokens.reclaim(&ids[3], &locker()).unwrap();

    assert_eq!(escrowed(&h), 0);
    assert_eq!(total(&h), before);
    assert_eq!(balance(&h, &locker()), 30);
    assert_eq!(balance(&h, &recipient()), 20);
}

#[test]
fn test_ledger_failures_conserve_total() {
    let clock = Arc::new(ManualClock::new(NOW));
    let h = Harness::manual(clock.clone()).unwrap();
    h.issue(&locker(), 10).unwrap();
    let before = total(&h);

    h.ledger.fail_next(LedgerOp::DebitBalance);
    assert!(matches!(
        h.tokens
            .lock(TOKEN_TYPE, 4, &locker(), &recipient(), &commit(b"abcd"), NOW + 10),
        Err(HtlcError::LedgerFailure(_))
    ));
    assert_eq!(total(&h), before);
    assert!(h.registry.is_empty());

    let receipt = h
        .tokens
        .lock(TOKEN_TYPE, 4, &locker(), &recipient(), &commit(b"abcd"), NOW + 10)
        .unwrap();
    clock.advance(10);

    h.ledger.fail_next(LedgerOp::CreditBalance);
    assert!(matches!(
        h.tokens.reclaim(receipt.contract_id(), &locker()),
        Err(HtlcError::LedgerFailure(_))
    ));
    assert_eq!(total(&h) + escrowed(&h), before);

    h.tokens.reclaim(receipt.contract_id(), &locker()).unwrap();
    assert_eq!(total(&h), before);
}
