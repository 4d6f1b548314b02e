//! Protobuf event payloads.
//!
//! Subscribers receive HTLC records in these shapes: `AssetContractHtlc` for
//! unique assets and `FungibleAssetContractHtlc` for token quantities.
//! Identities travel base64-encoded.

use prost::Message;

use crate::error::CoreError;
use crate::state_machine::HtlcStatus;
use crate::types::{AssetRef, HtlcRecord};

#[derive(Clone, PartialEq, Message)]
pub struct AssetExchangeAgreement {
    #[prost(string, tag = "1")]
    pub asset_type: String,
    #[prost(string, tag = "2")]
    pub id: String,
    #[prost(string, tag = "3")]
    pub locker: String,
    #[prost(string, tag = "4")]
    pub recipient: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct FungibleAssetExchangeAgreement {
    #[prost(string, tag = "1")]
    pub asset_type: String,
    #[prost(uint64, tag = "2")]
    pub num_units: u64,
    #[prost(string, tag = "3")]
    pub locker: String,
    #[prost(string, tag = "4")]
    pub recipient: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct HashLock {
    #[prost(string, tag = "1")]
    pub hash_base64: String,
    #[prost(uint64, tag = "2")]
    pub expiry_time_secs: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct AssetContractHtlc {
    #[prost(string, tag = "1")]
    pub contract_id: String,
    #[prost(message, optional, tag = "2")]
    pub agreement: Option<AssetExchangeAgreement>,
    #[prost(message, optional, tag = "3")]
    pub lock: Option<HashLock>,
    #[prost(int32, tag = "4")]
    pub status: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct FungibleAssetContractHtlc {
    #[prost(string, tag = "1")]
    pub contract_id: String,
    #[prost(message, optional, tag = "2")]
    pub agreement: Option<FungibleAssetExchangeAgreement>,
    #[prost(message, optional, tag = "3")]
    pub lock: Option<HashLock>,
    #[prost(int32, tag = "4")]
    pub status: i32,
}

impl AssetContractHtlc {
    /// Status carried by the payload.
    pub fn htlc_status(&self) -> Result<HtlcStatus, CoreError> {
        HtlcStatus::from_proto_i32(self.status)
    }
}

impl FungibleAssetContractHtlc {
    /// Status carried by the payload.
    pub fn htlc_status(&self) -> Result<HtlcStatus, CoreError> {
        HtlcStatus::from_proto_i32(self.status)
    }
}

fn hash_lock(record: &HtlcRecord) -> HashLock {
    HashLock {
        hash_base64: record.hash_lock.clone(),
        expiry_time_secs: record.expiry_time_secs,
    }
}

/// Encode a record as the protobuf message matching its asset kind.
pub fn encode_record(record: &HtlcRecord) -> Vec<u8> {
    match &record.asset {
        AssetRef::NonFungible(key) => AssetContractHtlc {
            contract_id: record.contract_id.to_string(),
            agreement: Some(AssetExchangeAgreement {
                asset_type: key.asset_type.clone(),
                id: key.asset_id.clone(),
                locker: record.locker.to_base64(),
                recipient: record.recipient.to_base64(),
            }),
            lock: Some(hash_lock(record)),
            status: record.status.to_proto_i32(),
        }
        .encode_to_vec(),
        AssetRef::Fungible {
            asset_type,
            quantity,
        } => FungibleAssetContractHtlc {
            contract_id: record.contract_id.to_string(),
            agreement: Some(FungibleAssetExchangeAgreement {
                asset_type: asset_type.clone(),
                num_units: *quantity,
                locker: record.locker.to_base64(),
                recipient: record.recipient.to_base64(),
            }),
            lock: Some(hash_lock(record)),
            status: record.status.to_proto_i32(),
        }
        .encode_to_vec(),
    }
}
