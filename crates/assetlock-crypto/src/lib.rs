pub mod error;
pub mod hashing;
pub mod preimage;

pub use error::CryptoError;
pub use hashing::{commit, decode_commitment, derive_contract_id, verify, Digest};
pub use preimage::{generate_preimage, Preimage};
