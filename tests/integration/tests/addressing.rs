//! Integration test: the two ways of addressing a bond lock.
//!
//! A lock can be reached through its contract id or through the asset it
//! holds plus the counterparty; both must resolve to the same record.

use std::sync::Arc;

use assetlock_core::wire::{AssetContractHtlc, FungibleAssetContractHtlc};
use assetlock_core::{HtlcStatus, Identity};
use assetlock_crypto::{commit, Preimage};
use assetlock_htlc::{EventKind, HtlcError, ManualClock};
use assetlock_integration_tests::{locker, recipient, Harness, BOND_TYPE, TOKEN_TYPE};
use prost::Message;

const NOW: u64 = 1_700_000_000;

fn harness() -> (Harness, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(NOW));
    (Harness::manual(clock.clone()).unwrap(), clock)
}

#[test]
fn test_both_addressing_modes_agree() {
    let (h, _clock) = harness();
    h.bond("a040", &locker()).unwrap();
    let receipt = h
        .bonds
        .lock(BOND_TYPE, "a040", &locker(), &recipient(), &commit(b"abcd"), NOW + 600)
        .unwrap();

    let by_id = h.bonds.is_locked(receipt.contract_id()).unwrap();
    let by_asset = h
        .bonds
        .is_locked_by_asset(BOND_TYPE, "a040", &locker(), &recipient())
        .unwrap();
    assert_eq!(by_id, by_asset);
    assert!(by_id.locked);

    // Claim through one path is visible through the other.
    h.bonds
        .claim(receipt.contract_id(), &recipient(), b"abcd")
        .unwrap();
    let by_asset = h
        .bonds
        .is_locked_by_asset(BOND_TYPE, "a040", &locker(), &recipient())
        .unwrap();
    assert!(!by_asset.locked);
    assert_eq!(by_asset.record.status, HtlcStatus::Claimed);
}

#[test]
fn test_wrong_counterparty_is_not_found() {
    let (h, clock) = harness();
    h.bond("a041", &locker()).unwrap();
    h.bonds
        .lock(BOND_TYPE, "a041", &locker(), &recipient(), &commit(b"abcd"), NOW + 5)
        .unwrap();

    let stranger = Identity::from_certificate("User2@org2.network1.com");
    assert!(matches!(
        h.bonds
            .is_locked_by_asset(BOND_TYPE, "a041", &locker(), &stranger),
        Err(HtlcError::NotFound(_))
    ));

    clock.advance(5);
    assert!(matches!(
        h.bonds
            .reclaim_by_asset(BOND_TYPE, "a041", &stranger, &locker()),
        Err(HtlcError::NotFound(_))
    ));
    h.bonds
        .reclaim_by_asset(BOND_TYPE, "a041", &recipient(), &locker())
        .unwrap();
}

#[test]
fn test_token_contract_is_not_a_bond_contract() {
    let (h, _clock) = harness();
    h.issue(&locker(), 5).unwrap();
    let receipt = h
        .tokens
        .lock(TOKEN_TYPE, 5, &locker(), &recipient(), &commit(b"abcd"), NOW + 600)
        .unwrap();

    assert!(matches!(
        h.bonds.is_locked(receipt.contract_id()),
        Err(HtlcError::NotFound(_))
    ));
    assert!(matches!(
        h.bonds.claim(receipt.contract_id(), &recipient(), b"abcd"),
        Err(HtlcError::NotFound(_))
    ));
    assert!(h.tokens.is_locked(receipt.contract_id()).unwrap().locked);
}

#[test]
fn test_contract_ids_are_unique_per_lock() {
    let (h, _clock) = harness();
    h.issue(&locker(), 10).unwrap();
    let hash = commit(b"abcd");

    let first = h
        .tokens
        .lock(TOKEN_TYPE, 5, &locker(), &recipient(), &hash, NOW + 600)
        .unwrap();
    let second = h
        .tokens
        .lock(TOKEN_TYPE, 5, &locker(), &recipient(), &hash, NOW + 600)
        .unwrap();
    assert_ne!(first.contract_id(), second.contract_id());
    assert_eq!(h.registry.len(), 2);
}

#[test]
fn test_base64_transport_preimage_claims() {
    let (h, _clock) = harness();
    h.bond("a020", &locker()).unwrap();
    h.bonds
        .lock(BOND_TYPE, "a020", &locker(), &recipient(), &commit(b"abcd"), NOW + 600)
        .unwrap();

    let preimage = Preimage::from_base64("YWJjZA==").unwrap();
    let receipt = h
        .bonds
        .claim_by_asset(BOND_TYPE, "a020", &locker(), &recipient(), preimage.as_bytes())
        .unwrap();
    assert_eq!(receipt.record.status, HtlcStatus::Claimed);
}

#[test]
fn test_event_payloads_decode() {
    let (h, _clock) = harness();
    let mut events = h.bus.subscribe();
    h.bond("a1", &locker()).unwrap();
    h.issue(&locker(), 5).unwrap();

    let bond = h
        .bonds
        .lock(BOND_TYPE, "a1", &locker(), &recipient(), &commit(b"abcd"), NOW + 600)
        .unwrap();
    let token = h
        .tokens
        .lock(TOKEN_TYPE, 5, &locker(), &recipient(), &commit(b"abcd"), NOW + 600)
        .unwrap();

    let published = events.drain();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].kind, EventKind::LockAsset);
    assert_eq!(published[1].kind, EventKind::LockFungibleAsset);

    let decoded = AssetContractHtlc::decode(published[0].payload().as_slice()).unwrap();
    assert_eq!(decoded.contract_id, bond.contract_id().as_str());

    let decoded = FungibleAssetContractHtlc::decode(published[1].payload().as_slice()).unwrap();
    assert_eq!(decoded.contract_id, token.contract_id().as_str());
}
