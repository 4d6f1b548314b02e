use assetlock_core::{AssetKey, HtlcRecord, Identity};
use serde::{Deserialize, Serialize};

use crate::events::HtlcEvent;

/// A unique ledger asset (e.g. a bond).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondAsset {
    pub asset_type: String,
    pub id: String,
    pub owner: Identity,
    pub issuer: String,
    pub face_value: u64,
    pub maturity: String,
    /// Set while an HTLC escrows the asset; direct transfers are refused.
    pub locked: bool,
}

impl BondAsset {
    pub fn key(&self) -> AssetKey {
        AssetKey::new(self.asset_type.clone(), self.id.clone())
    }
}

/// A fungible token type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAssetType {
    pub name: String,
    pub issuer: String,
    /// Nominal value of one unit.
    pub value: u64,
}

/// Result of a committed HTLC state change.
///
/// Carries the record as committed together with the single event that was
/// published for the transition.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub record: HtlcRecord,
    pub event: HtlcEvent,
}

impl Receipt {
    pub fn contract_id(&self) -> &assetlock_core::ContractId {
        &self.record.contract_id
    }
}

/// Answer to an is-locked query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockState {
    /// `true` only while the record is Locked and not yet expired.
    pub locked: bool,
    pub record: HtlcRecord,
}
