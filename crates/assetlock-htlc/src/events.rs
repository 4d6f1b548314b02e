//! HTLC events and the broadcast bus that delivers them.
//!
//! One event is published per committed transition, after the registry
//! update. Delivery beyond this process is the subscriber's concern.

use std::time::Duration;

use assetlock_core::{wire, AssetKind, ContractId, HtlcRecord};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::traits::EventSink;

/// Kinds of HTLC events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    LockAsset,
    ClaimAsset,
    UnlockAsset,
    LockFungibleAsset,
    ClaimFungibleAsset,
    UnlockFungibleAsset,
}

impl EventKind {
    /// Event name as seen by subscribers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LockAsset => "LockAsset",
            Self::ClaimAsset => "ClaimAsset",
            Self::UnlockAsset => "UnlockAsset",
            Self::LockFungibleAsset => "LockFungibleAsset",
            Self::ClaimFungibleAsset => "ClaimFungibleAsset",
            Self::UnlockFungibleAsset => "UnlockFungibleAsset",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LockAsset" => Some(Self::LockAsset),
            "ClaimAsset" => Some(Self::ClaimAsset),
            "UnlockAsset" => Some(Self::UnlockAsset),
            "LockFungibleAsset" => Some(Self::LockFungibleAsset),
            "ClaimFungibleAsset" => Some(Self::ClaimFungibleAsset),
            "UnlockFungibleAsset" => Some(Self::UnlockFungibleAsset),
            _ => None,
        }
    }

    pub fn asset_kind(&self) -> AssetKind {
        match self {
            Self::LockAsset | Self::ClaimAsset | Self::UnlockAsset => AssetKind::NonFungible,
            _ => AssetKind::Fungible,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Notification of a committed HTLC transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtlcEvent {
    pub kind: EventKind,
    pub contract_id: ContractId,
    /// The record as committed by the transition.
    pub record: HtlcRecord,
}

impl HtlcEvent {
    pub fn new(kind: EventKind, record: HtlcRecord) -> Self {
        Self {
            kind,
            contract_id: record.contract_id.clone(),
            record,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Protobuf payload of the record (`AssetContractHtlc` or
    /// `FungibleAssetContractHtlc`).
    pub fn payload(&self) -> Vec<u8> {
        wire::encode_record(&self.record)
    }
}

/// In-process event bus backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<HtlcEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: HtlcEvent) {
        let name = event.name();
        let contract_id = event.contract_id.clone();
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(
                    event = name,
                    contract_id = %contract_id,
                    receivers,
                    "event published"
                );
            }
            Err(_) => {
                tracing::debug!(
                    event = name,
                    contract_id = %contract_id,
                    "event published with no subscribers"
                );
            }
        }
    }
}

/// A subscriber's view of the bus.
pub struct EventSubscription {
    rx: broadcast::Receiver<HtlcEvent>,
}

impl EventSubscription {
    /// Wait for the next event of `kind`, skipping others.
    ///
    /// Returns `None` if nothing arrives before `timeout` or the bus closes.
    pub async fn wait_for(&mut self, kind: EventKind, timeout: Duration) -> Option<HtlcEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Ok(event)) if event.kind == kind => return Some(event),
                Ok(Ok(_)) => continue,
                Ok(Err(RecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Ok(Err(RecvError::Closed)) => return None,
                Err(_) => {
                    tracing::warn!(event = kind.name(), ?timeout, "did not receive event");
                    return None;
                }
            }
        }
    }

    /// Next buffered event, if any, without waiting.
    pub fn try_next(&mut self) -> Option<HtlcEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drain every buffered event.
    pub fn drain(&mut self) -> Vec<HtlcEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}
