//! AssetLock HTLC engine
//!
//! Hash Time-Locked Contracts over ledger-resident assets: a registry that
//! owns all lock state, controllers for unique (bond) assets and fungible
//! token quantities, an event bus for lock/claim/unlock notifications, and
//! an in-memory asset ledger adapter.

pub mod error;
pub mod types;
pub mod traits;
pub mod clock;
pub mod events;
pub mod registry;
pub mod context;
pub mod bond;
pub mod fungible;
pub mod adapters;

pub use adapters::memory::{LedgerOp, MemoryLedger};
pub use bond::BondHtlc;
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::HtlcContext;
pub use error::{HtlcError, LedgerError};
pub use events::{EventBus, EventKind, EventSubscription, HtlcEvent};
pub use fungible::FungibleHtlc;
pub use registry::HtlcRegistry;
pub use traits::{AssetLedger, EventSink};
pub use types::{BondAsset, LockState, Receipt, TokenAssetType};
