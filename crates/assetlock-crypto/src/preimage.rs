use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::RngCore;

use crate::error::CryptoError;
use crate::hashing::commit;

/// Secret revealed by the recipient to claim an HTLC.
#[derive(Clone, PartialEq, Eq)]
pub struct Preimage(Vec<u8>);

impl Preimage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a preimage from its base64 transport form.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        BASE64
            .decode(encoded)
            .map(Self)
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    /// The hash-lock commitment for this preimage.
    pub fn commitment(&self) -> String {
        commit(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Preimage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Preimage(<{} bytes>)", self.0.len())
    }
}

/// Generate a random 32-byte preimage.
pub fn generate_preimage() -> Preimage {
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    Preimage(secret.to_vec())
}
