//! HTLC controller for unique (non-fungible) assets such as bonds.
//!
//! A lock escrows the asset in place: the ledger flags it as locked so it
//! cannot be transferred directly, and ownership only moves when the
//! recipient claims with the preimage. Records can be addressed by contract
//! id or by the asset's `(type, id)` together with the counterparty.

use assetlock_core::{
    AssetKey, AssetKind, AssetRef, ContractId, HtlcAction, HtlcRecord, HtlcStatus, Identity,
};
use assetlock_crypto::verify;

use crate::context::HtlcContext;
use crate::error::HtlcError;
use crate::events::EventKind;
use crate::types::{LockState, Receipt};

pub struct BondHtlc {
    ctx: HtlcContext,
}

impl BondHtlc {
    pub fn new(ctx: HtlcContext) -> Self {
        Self { ctx }
    }

    /// Lock `asset_type`/`asset_id`, owned by `locker`, for `recipient`.
    ///
    /// `hash_lock` is the base64 SHA-256 commitment of the preimage.
    pub fn lock(
        &self,
        asset_type: &str,
        asset_id: &str,
        locker: &Identity,
        recipient: &Identity,
        hash_lock: &str,
        expiry_time_secs: u64,
    ) -> Result<Receipt, HtlcError> {
        self.ctx
            .validate_lock(locker, recipient, hash_lock, expiry_time_secs)?;

        let key = AssetKey::new(asset_type, asset_id);
        let asset = self.ctx.ledger.read_asset(&key)?;
        if &asset.owner != locker {
            return Err(HtlcError::Unauthorized(format!(
                "locker does not own asset {}",
                key
            )));
        }
        if asset.locked || self.has_open_lock(&key) {
            return Err(HtlcError::InvalidInput(format!(
                "asset {} is already locked",
                key
            )));
        }

        let record = self.ctx.new_record(
            AssetRef::NonFungible(key.clone()),
            locker,
            recipient,
            hash_lock,
            expiry_time_secs,
        );
        let ledger = &self.ctx.ledger;
        let record = self
            .ctx
            .registry
            .create(record, |_| Ok(ledger.mark_locked(&key)?))?;

        Ok(self.ctx.emit(EventKind::LockAsset, record))
    }

    /// Query a lock by contract id.
    ///
    /// `locked` is false once the record is terminal or its deadline passed,
    /// even if nobody has reclaimed it yet.
    pub fn is_locked(&self, contract_id: &ContractId) -> Result<LockState, HtlcError> {
        let record = self
            .ctx
            .registry
            .get_kind(contract_id, AssetKind::NonFungible)?;
        Ok(self.lock_state(record))
    }

    /// Query a lock by asset identity and parties.
    pub fn is_locked_by_asset(
        &self,
        asset_type: &str,
        asset_id: &str,
        locker: &Identity,
        recipient: &Identity,
    ) -> Result<LockState, HtlcError> {
        let key = AssetKey::new(asset_type, asset_id);
        let record = self
            .ctx
            .registry
            .get_by_asset_identity(&key, locker, recipient)?;
        Ok(self.lock_state(record))
    }

    /// Claim by revealing the preimage; ownership moves to the recipient.
    pub fn claim(
        &self,
        contract_id: &ContractId,
        claimant: &Identity,
        preimage: &[u8],
    ) -> Result<Receipt, HtlcError> {
        let ctx = &self.ctx;

        let record = ctx.registry.transition(
            contract_id,
            AssetKind::NonFungible,
            HtlcAction::Claim,
            |r| {
                let now = ctx.now_secs();
                if claimant != &r.recipient {
                    return Err(HtlcError::Unauthorized(format!(
                        "only the recipient may claim htlc {}",
                        r.contract_id
                    )));
                }
                if r.is_expired_at(now) {
                    return Err(HtlcError::Expired(r.contract_id.clone()));
                }
                if !verify(preimage, &r.hash_lock) {
                    return Err(HtlcError::BadPreimage(r.contract_id.clone()));
                }
                Ok(ctx
                    .ledger
                    .transfer_escrowed(asset_key(r)?, &r.locker, &r.recipient)?)
            },
        )?;

        tracing::info!(
            contract_id = %record.contract_id,
            asset = %record.asset,
            "bond asset claimed"
        );
        Ok(self.ctx.emit(EventKind::ClaimAsset, record))
    }

    /// Claim the lock `locker` placed on `asset_type`/`asset_id`.
    pub fn claim_by_asset(
        &self,
        asset_type: &str,
        asset_id: &str,
        locker: &Identity,
        claimant: &Identity,
        preimage: &[u8],
    ) -> Result<Receipt, HtlcError> {
        let key = AssetKey::new(asset_type, asset_id);
        let record = self.ctx.registry.find_by_asset(&key)?;
        if &record.locker != locker {
            return Err(HtlcError::NotFound(key.to_string()));
        }
        self.claim(&record.contract_id, claimant, preimage)
    }

    /// Take an expired lock back; the asset stays with the locker, unlocked.
    pub fn reclaim(
        &self,
        contract_id: &ContractId,
        claimant: &Identity,
    ) -> Result<Receipt, HtlcError> {
        let ctx = &self.ctx;

        let record = ctx.registry.transition(
            contract_id,
            AssetKind::NonFungible,
            HtlcAction::Reclaim,
            |r| {
                let now = ctx.now_secs();
                if claimant != &r.locker {
                    return Err(HtlcError::Unauthorized(format!(
                        "only the locker may reclaim htlc {}",
                        r.contract_id
                    )));
                }
                if !r.is_expired_at(now) {
                    return Err(HtlcError::NotYetExpired(r.contract_id.clone()));
                }
                Ok(ctx.ledger.mark_unlocked(asset_key(r)?)?)
            },
        )?;

        tracing::info!(
            contract_id = %record.contract_id,
            asset = %record.asset,
            "bond asset reclaimed"
        );
        Ok(self.ctx.emit(EventKind::UnlockAsset, record))
    }

    /// Reclaim the lock placed on `asset_type`/`asset_id` for `recipient`.
    pub fn reclaim_by_asset(
        &self,
        asset_type: &str,
        asset_id: &str,
        recipient: &Identity,
        claimant: &Identity,
    ) -> Result<Receipt, HtlcError> {
        let key = AssetKey::new(asset_type, asset_id);
        let record = self.ctx.registry.find_by_asset(&key)?;
        if &record.recipient != recipient {
            return Err(HtlcError::NotFound(key.to_string()));
        }
        self.reclaim(&record.contract_id, claimant)
    }

    fn has_open_lock(&self, key: &AssetKey) -> bool {
        self.ctx
            .registry
            .find_by_asset(key)
            .is_ok_and(|r| r.status == HtlcStatus::Locked)
    }

    fn lock_state(&self, record: HtlcRecord) -> LockState {
        LockState {
            locked: record.is_active_at(self.ctx.now_secs()),
            record,
        }
    }
}

fn asset_key(record: &HtlcRecord) -> Result<&AssetKey, HtlcError> {
    record.asset.asset_key().ok_or_else(|| {
        HtlcError::InvalidInput(format!(
            "htlc {} does not hold a unique asset",
            record.contract_id
        ))
    })
}
