use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::state_machine::HtlcStatus;

/// Opaque identity reference of a ledger participant.
///
/// The bytes are usually an X.509 certificate; they are only ever compared
/// for equality and rendered as base64 for transport.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(Vec<u8>);

impl Identity {
    /// Create an identity from a PEM-encoded certificate.
    pub fn from_certificate(pem: &str) -> Self {
        Self(pem.as_bytes().to_vec())
    }

    /// Decode an identity from its base64 transport form.
    pub fn from_base64(encoded: &str) -> Result<Self, CoreError> {
        BASE64
            .decode(encoded)
            .map(Self)
            .map_err(|e| CoreError::InvalidEncoding(format!("identity: {}", e)))
    }

    /// Base64 transport form.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Certificates are long; a short fingerprint is enough for logs.
        let encoded = self.to_base64();
        let short: String = encoded.chars().take(12).collect();
        write!(f, "Identity({}..)", short)
    }
}

/// Identifier of an HTLC record, derived at lock creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub String);

impl ContractId {
    /// Build a contract id from a 32-byte digest (hex encoded).
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContractId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Natural identity of a unique (non-fungible) asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetKey {
    pub asset_type: String,
    pub asset_id: String,
}

impl AssetKey {
    pub fn new(asset_type: impl Into<String>, asset_id: impl Into<String>) -> Self {
        Self {
            asset_type: asset_type.into(),
            asset_id: asset_id.into(),
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.asset_type, self.asset_id)
    }
}

/// Kind of asset held by an HTLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    NonFungible,
    Fungible,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFungible => write!(f, "NonFungible"),
            Self::Fungible => write!(f, "Fungible"),
        }
    }
}

/// What an HTLC escrows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetRef {
    /// A single uniquely identified asset (e.g. a bond).
    NonFungible(AssetKey),
    /// A quantity of a fungible token type.
    Fungible { asset_type: String, quantity: u64 },
}

impl AssetRef {
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::NonFungible(_) => AssetKind::NonFungible,
            Self::Fungible { .. } => AssetKind::Fungible,
        }
    }

    pub fn asset_type(&self) -> &str {
        match self {
            Self::NonFungible(key) => &key.asset_type,
            Self::Fungible { asset_type, .. } => asset_type,
        }
    }

    /// The asset key, for non-fungible references.
    pub fn asset_key(&self) -> Option<&AssetKey> {
        match self {
            Self::NonFungible(key) => Some(key),
            Self::Fungible { .. } => None,
        }
    }

    /// The locked quantity, for fungible references.
    pub fn quantity(&self) -> Option<u64> {
        match self {
            Self::NonFungible(_) => None,
            Self::Fungible { quantity, .. } => Some(*quantity),
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFungible(key) => write!(f, "{}", key),
            Self::Fungible {
                asset_type,
                quantity,
            } => write!(f, "{} x {}", quantity, asset_type),
        }
    }
}

/// A Hash Time-Locked Contract record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtlcRecord {
    /// Unique identifier of this HTLC.
    pub contract_id: ContractId,
    /// The escrowed asset.
    pub asset: AssetRef,
    /// Party that created the lock and may reclaim after expiry.
    pub locker: Identity,
    /// Party that may claim with the preimage before expiry.
    pub recipient: Identity,
    /// Base64-encoded SHA-256 commitment to the preimage.
    pub hash_lock: String,
    /// Absolute expiry as seconds since the UNIX epoch.
    pub expiry_time_secs: u64,
    /// Current status.
    pub status: HtlcStatus,
    /// When the lock was created.
    pub created_at: DateTime<Utc>,
}

impl HtlcRecord {
    pub fn kind(&self) -> AssetKind {
        self.asset.kind()
    }

    /// Whether the deadline has passed at `now_secs`.
    pub fn is_expired_at(&self, now_secs: u64) -> bool {
        now_secs >= self.expiry_time_secs
    }

    /// Locked and not yet expired at `now_secs`.
    pub fn is_active_at(&self, now_secs: u64) -> bool {
        self.status == HtlcStatus::Locked && !self.is_expired_at(now_secs)
    }

    /// Whether `locker` and `recipient` are the parties of this record.
    pub fn has_parties(&self, locker: &Identity, recipient: &Identity) -> bool {
        &self.locker == locker && &self.recipient == recipient
    }
}
