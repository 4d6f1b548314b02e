use assetlock_core::{AssetRef, ContractId, Identity};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest as _, Sha256};

use crate::error::CryptoError;

/// 256-bit digest.
pub type Digest = [u8; 32];

/// Compute the hash-lock commitment of a preimage: `base64(sha256(preimage))`.
pub fn commit(preimage: &[u8]) -> String {
    let digest: Digest = Sha256::digest(preimage).into();
    BASE64.encode(digest)
}

/// Verify a preimage against a commitment by recomputing it.
/// Comparison is exact on the encoded form; no normalization is applied.
pub fn verify(preimage: &[u8], commitment: &str) -> bool {
    commit(preimage).as_bytes() == commitment.as_bytes()
}

/// Decode a base64 commitment and check it is a 32-byte digest.
pub fn decode_commitment(commitment: &str) -> Result<Digest, CryptoError> {
    let bytes = BASE64
        .decode(commitment)
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidDigestLength {
            expected: 32,
            actual,
        })
}

/// Derive a contract id from the lock parameters and a caller-supplied nonce.
///
/// Every variable-length field is length-prefixed so distinct parameter sets
/// never produce the same BLAKE3 input.
pub fn derive_contract_id(
    asset: &AssetRef,
    locker: &Identity,
    recipient: &Identity,
    hash_lock: &str,
    expiry_time_secs: u64,
    nonce: &[u8],
) -> ContractId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"assetlock/htlc/v1");

    match asset {
        AssetRef::NonFungible(key) => {
            hasher.update(&[0u8]);
            update_field(&mut hasher, key.asset_type.as_bytes());
            update_field(&mut hasher, key.asset_id.as_bytes());
        }
        AssetRef::Fungible {
            asset_type,
            quantity,
        } => {
            hasher.update(&[1u8]);
            update_field(&mut hasher, asset_type.as_bytes());
            hasher.update(&quantity.to_be_bytes());
        }
    }

    update_field(&mut hasher, locker.as_bytes());
    update_field(&mut hasher, recipient.as_bytes());
    update_field(&mut hasher, hash_lock.as_bytes());
    hasher.update(&expiry_time_secs.to_be_bytes());
    update_field(&mut hasher, nonce);

    ContractId::from_digest(hasher.finalize().as_bytes())
}

fn update_field(hasher: &mut blake3::Hasher, field: &[u8]) {
    hasher.update(&(field.len() as u64).to_be_bytes());
    hasher.update(field);
}
