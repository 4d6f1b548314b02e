use std::sync::Arc;

use assetlock_core::{AssetRef, ContractId, HtlcConfig, HtlcRecord, Identity};
use assetlock_crypto::{decode_commitment, derive_contract_id};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::HtlcError;
use crate::events::{EventKind, HtlcEvent};
use crate::registry::HtlcRegistry;
use crate::traits::{AssetLedger, EventSink};
use crate::types::Receipt;

/// Collaborators shared by the bond and token controllers.
///
/// The registry is the only shared mutable state; the ledger, event sink and
/// clock are injected so controllers can run against in-memory fakes.
#[derive(Clone)]
pub struct HtlcContext {
    pub registry: Arc<HtlcRegistry>,
    pub ledger: Arc<dyn AssetLedger>,
    pub events: Arc<dyn EventSink>,
    pub clock: Arc<dyn Clock>,
    pub config: HtlcConfig,
}

impl HtlcContext {
    pub fn new(
        registry: Arc<HtlcRegistry>,
        ledger: Arc<dyn AssetLedger>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            ledger,
            events,
            clock,
            config: HtlcConfig::default(),
        }
    }

    pub fn with_config(mut self, config: HtlcConfig) -> Self {
        self.config = config;
        self
    }

    pub fn now_secs(&self) -> u64 {
        self.clock.now_secs()
    }

    /// Check the parameters common to every lock and return the current time.
    pub(crate) fn validate_lock(
        &self,
        locker: &Identity,
        recipient: &Identity,
        hash_lock: &str,
        expiry_time_secs: u64,
    ) -> Result<u64, HtlcError> {
        if locker.is_empty() || recipient.is_empty() {
            return Err(HtlcError::InvalidInput(
                "locker and recipient are required".into(),
            ));
        }
        if locker == recipient {
            return Err(HtlcError::InvalidInput(
                "locker and recipient must differ".into(),
            ));
        }
        decode_commitment(hash_lock)
            .map_err(|e| HtlcError::InvalidInput(format!("hash lock: {}", e)))?;

        let now = self.now_secs();
        if expiry_time_secs <= now {
            return Err(HtlcError::InvalidInput(format!(
                "expiry {} is not in the future (now {})",
                expiry_time_secs, now
            )));
        }
        if expiry_time_secs - now > self.config.max_lock_secs {
            return Err(HtlcError::InvalidInput(format!(
                "lock duration {}s exceeds maximum {}s",
                expiry_time_secs - now,
                self.config.max_lock_secs
            )));
        }
        Ok(now)
    }

    /// Build a fresh `Locked` record with a newly derived contract id.
    pub(crate) fn new_record(
        &self,
        asset: AssetRef,
        locker: &Identity,
        recipient: &Identity,
        hash_lock: &str,
        expiry_time_secs: u64,
    ) -> HtlcRecord {
        let nonce = Uuid::now_v7();
        let contract_id: ContractId = derive_contract_id(
            &asset,
            locker,
            recipient,
            hash_lock,
            expiry_time_secs,
            nonce.as_bytes(),
        );
        HtlcRecord {
            contract_id,
            asset,
            locker: locker.clone(),
            recipient: recipient.clone(),
            hash_lock: hash_lock.to_string(),
            expiry_time_secs,
            status: assetlock_core::HtlcStatus::Locked,
            created_at: chrono::Utc::now(),
        }
    }

    /// Publish the event for a committed record and hand back the receipt.
    pub(crate) fn emit(&self, kind: EventKind, record: HtlcRecord) -> Receipt {
        let event = HtlcEvent::new(kind, record.clone());
        self.events.publish(event.clone());
        Receipt { record, event }
    }
}
