use assetlock_core::{
    AssetKey, AssetKind, ContractId, HtlcAction, HtlcRecord, HtlcStateMachine, HtlcStatus,
    Identity,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::HtlcError;

/// Authoritative store of HTLC records.
///
/// Records are keyed by contract id. Unique assets are also reachable
/// through a secondary index from asset key to the contract id of the most
/// recent lock on that asset; both paths resolve to the same stored record.
/// Terminal records are retained for audit.
///
/// Thread-safe: uses `DashMap` for concurrent access. Every mutation runs its
/// side effect while holding the record's entry, so a status change and the
/// ledger effect that goes with it commit together or not at all.
pub struct HtlcRegistry {
    records: DashMap<ContractId, HtlcRecord>,
    asset_index: DashMap<AssetKey, ContractId>,
}

impl HtlcRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            asset_index: DashMap::new(),
        }
    }

    /// Persist a new `Locked` record once `effect` has succeeded.
    ///
    /// Fails with `Conflict` if the contract id is taken or, for a unique
    /// asset, another record on the same asset is still `Locked`. When
    /// `effect` fails nothing is stored.
    pub fn create<F>(&self, mut record: HtlcRecord, effect: F) -> Result<HtlcRecord, HtlcError>
    where
        F: FnOnce(&HtlcRecord) -> Result<(), HtlcError>,
    {
        record.status = HtlcStatus::Locked;

        let Some(key) = record.asset.asset_key().cloned() else {
            return self.insert_record(record, effect);
        };

        // Lock order: asset index entry first, then the record entry.
        let index_entry = self.asset_index.entry(key.clone());
        if let Entry::Occupied(existing) = &index_entry {
            let still_locked = self
                .records
                .get(existing.get())
                .is_some_and(|r| r.status == HtlcStatus::Locked);
            if still_locked {
                return Err(HtlcError::Conflict(format!(
                    "asset {} is already locked by htlc {}",
                    key,
                    existing.get()
                )));
            }
        }

        let stored = self.insert_record(record, effect)?;
        index_entry.insert(stored.contract_id.clone());
        Ok(stored)
    }

    fn insert_record<F>(&self, record: HtlcRecord, effect: F) -> Result<HtlcRecord, HtlcError>
    where
        F: FnOnce(&HtlcRecord) -> Result<(), HtlcError>,
    {
        match self.records.entry(record.contract_id.clone()) {
            Entry::Occupied(_) => Err(HtlcError::Conflict(format!(
                "contract id {} already in use",
                record.contract_id
            ))),
            Entry::Vacant(slot) => {
                effect(&record)?;
                slot.insert(record.clone());
                tracing::info!(
                    contract_id = %record.contract_id,
                    asset = %record.asset,
                    expiry_time_secs = record.expiry_time_secs,
                    "HTLC created"
                );
                Ok(record)
            }
        }
    }

    /// Move a `Locked` record of `kind` to the status implied by `action`.
    ///
    /// This is a compare-and-set on the status: of two racing transitions on
    /// the same record exactly one succeeds and the other gets
    /// `InvalidState`. `effect` sees the current record, checks the caller's
    /// preconditions and applies the ledger side of the transition; if it
    /// fails the status stays `Locked`.
    pub fn transition<F>(
        &self,
        contract_id: &ContractId,
        kind: AssetKind,
        action: HtlcAction,
        effect: F,
    ) -> Result<HtlcRecord, HtlcError>
    where
        F: FnOnce(&HtlcRecord) -> Result<(), HtlcError>,
    {
        let mut entry = self
            .records
            .get_mut(contract_id)
            .filter(|r| r.kind() == kind)
            .ok_or_else(|| HtlcError::NotFound(contract_id.to_string()))?;

        let next = HtlcStateMachine::transition(entry.status, action).map_err(|_| {
            HtlcError::InvalidState {
                contract_id: contract_id.clone(),
                status: entry.status,
            }
        })?;

        if let Err(err) = effect(entry.value()) {
            tracing::debug!(contract_id = %contract_id, error = %err, "HTLC transition rejected");
            return Err(err);
        }

        entry.status = next;
        tracing::info!(contract_id = %contract_id, status = %next, "HTLC transitioned");
        Ok(entry.clone())
    }

    /// Get a record by contract id.
    pub fn get(&self, contract_id: &ContractId) -> Result<HtlcRecord, HtlcError> {
        self.records
            .get(contract_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| HtlcError::NotFound(contract_id.to_string()))
    }

    /// Get a record by contract id, restricted to one asset kind.
    pub fn get_kind(
        &self,
        contract_id: &ContractId,
        kind: AssetKind,
    ) -> Result<HtlcRecord, HtlcError> {
        self.get(contract_id)
            .ok()
            .filter(|r| r.kind() == kind)
            .ok_or_else(|| HtlcError::NotFound(contract_id.to_string()))
    }

    /// Most recent record for a unique asset, whatever its parties.
    pub fn find_by_asset(&self, key: &AssetKey) -> Result<HtlcRecord, HtlcError> {
        let contract_id = self
            .asset_index
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| HtlcError::NotFound(key.to_string()))?;
        self.get(&contract_id)
    }

    /// Record for a unique asset locked by `locker` for `recipient`.
    pub fn get_by_asset_identity(
        &self,
        key: &AssetKey,
        locker: &Identity,
        recipient: &Identity,
    ) -> Result<HtlcRecord, HtlcError> {
        let record = self.find_by_asset(key)?;
        if record.has_parties(locker, recipient) {
            Ok(record)
        } else {
            tracing::debug!(asset = %key, "asset lock exists for different parties");
            Err(HtlcError::NotFound(key.to_string()))
        }
    }

    /// Snapshot of all records.
    pub fn records(&self) -> Vec<HtlcRecord> {
        self.records.iter().map(|entry| entry.clone()).collect()
    }

    /// Number of records still `Locked` (expired or not).
    pub fn active_count(&self) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.status == HtlcStatus::Locked)
            .count()
    }

    /// Get the number of tracked records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the registry has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for HtlcRegistry {
    fn default() -> Self {
        Self::new()
    }
}
