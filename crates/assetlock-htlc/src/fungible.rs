//! HTLC controller for fungible token quantities.
//!
//! Locking moves the quantity out of the locker's spendable balance into
//! escrow held by the record. Claim credits it to the recipient, reclaim
//! returns it to the locker, so the total across both parties is conserved.
//! A fungible quantity has no natural identity, so records are addressed by
//! contract id only.

use assetlock_core::{AssetKind, AssetRef, ContractId, HtlcAction, HtlcRecord, Identity};
use assetlock_crypto::verify;

use crate::context::HtlcContext;
use crate::error::HtlcError;
use crate::events::EventKind;
use crate::types::{LockState, Receipt};

pub struct FungibleHtlc {
    ctx: HtlcContext,
}

impl FungibleHtlc {
    pub fn new(ctx: HtlcContext) -> Self {
        Self { ctx }
    }

    /// Escrow `quantity` units of `asset_type` from `locker` for `recipient`.
    pub fn lock(
        &self,
        asset_type: &str,
        quantity: u64,
        locker: &Identity,
        recipient: &Identity,
        hash_lock: &str,
        expiry_time_secs: u64,
    ) -> Result<Receipt, HtlcError> {
        if asset_type.is_empty() {
            return Err(HtlcError::InvalidInput("asset type is required".into()));
        }
        if quantity == 0 {
            return Err(HtlcError::InvalidInput("quantity must be positive".into()));
        }
        self.ctx
            .validate_lock(locker, recipient, hash_lock, expiry_time_secs)?;

        let available = self.ctx.ledger.balance(asset_type, locker)?;
        if available < quantity {
            return Err(HtlcError::InsufficientBalance {
                available,
                required: quantity,
            });
        }

        let record = self.ctx.new_record(
            AssetRef::Fungible {
                asset_type: asset_type.to_string(),
                quantity,
            },
            locker,
            recipient,
            hash_lock,
            expiry_time_secs,
        );
        let ledger = &self.ctx.ledger;
        let record = self.ctx.registry.create(record, |_| {
            Ok(ledger.debit_balance(asset_type, locker, quantity)?)
        })?;

        Ok(self.ctx.emit(EventKind::LockFungibleAsset, record))
    }

    /// Query a lock by contract id. Expired locks report `locked == false`.
    pub fn is_locked(&self, contract_id: &ContractId) -> Result<LockState, HtlcError> {
        let record = self
            .ctx
            .registry
            .get_kind(contract_id, AssetKind::Fungible)?;
        Ok(LockState {
            locked: record.is_active_at(self.ctx.now_secs()),
            record,
        })
    }

    /// Claim by revealing the preimage; the escrowed units go to the recipient.
    pub fn claim(
        &self,
        contract_id: &ContractId,
        claimant: &Identity,
        preimage: &[u8],
    ) -> Result<Receipt, HtlcError> {
        let ctx = &self.ctx;

        let record = ctx.registry.transition(
            contract_id,
            AssetKind::Fungible,
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
                let (asset_type, quantity) = escrow(r)?;
                Ok(ctx.ledger.credit_balance(asset_type, &r.recipient, quantity)?)
            },
        )?;

        tracing::info!(
            contract_id = %record.contract_id,
            asset = %record.asset,
            "tokens claimed"
        );
        Ok(self.ctx.emit(EventKind::ClaimFungibleAsset, record))
    }

    /// Return the escrowed units of an expired lock to the locker.
    pub fn reclaim(
        &self,
        contract_id: &ContractId,
        claimant: &Identity,
    ) -> Result<Receipt, HtlcError> {
        let ctx = &self.ctx;

        let record = ctx.registry.transition(
            contract_id,
            AssetKind::Fungible,
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
                let (asset_type, quantity) = escrow(r)?;
                Ok(ctx.ledger.credit_balance(asset_type, &r.locker, quantity)?)
            },
        )?;

        tracing::info!(
            contract_id = %record.contract_id,
            asset = %record.asset,
            "tokens reclaimed"
        );
        Ok(self.ctx.emit(EventKind::UnlockFungibleAsset, record))
    }
}

fn escrow(record: &HtlcRecord) -> Result<(&str, u64), HtlcError> {
    match &record.asset {
        AssetRef::Fungible {
            asset_type,
            quantity,
        } => Ok((asset_type.as_str(), *quantity)),
        AssetRef::NonFungible(_) => Err(HtlcError::InvalidInput(format!(
            "htlc {} does not hold a token quantity",
            record.contract_id
        ))),
    }
}
