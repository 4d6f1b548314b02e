pub mod error;
pub mod types;
pub mod state_machine;
pub mod config;
pub mod wire;

pub use config::HtlcConfig;
pub use error::CoreError;
pub use state_machine::{HtlcAction, HtlcStateMachine, HtlcStatus};
pub use types::{AssetKey, AssetKind, AssetRef, ContractId, HtlcRecord, Identity};
