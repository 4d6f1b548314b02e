//! Fixtures shared by the cross-crate scenario tests.

use std::sync::Arc;

use assetlock_core::Identity;
use assetlock_htlc::{
    BondAsset, BondHtlc, Clock, EventBus, FungibleHtlc, HtlcContext, HtlcRegistry, LedgerError,
    ManualClock, MemoryLedger, SystemClock, TokenAssetType,
};

pub const BOND_TYPE: &str = "t1";
pub const TOKEN_TYPE: &str = "token1";

pub fn locker() -> Identity {
    Identity::from_certificate("Admin@org1.network1.com")
}

pub fn recipient() -> Identity {
    Identity::from_certificate("User1@org1.network1.com")
}

/// A full engine wired to an in-memory ledger.
pub struct Harness {
    pub ledger: Arc<MemoryLedger>,
    pub registry: Arc<HtlcRegistry>,
    pub bus: Arc<EventBus>,
    pub bonds: BondHtlc,
    pub tokens: FungibleHtlc,
    clock: Arc<dyn Clock>,
}

impl Harness {
    /// Engine driven by the wall clock.
    pub fn system() -> Result<Self, LedgerError> {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Engine driven by a manual clock the caller keeps a handle to.
    pub fn manual(clock: Arc<ManualClock>) -> Result<Self, LedgerError> {
        Self::with_clock(clock)
    }

    fn with_clock(clock: Arc<dyn Clock>) -> Result<Self, LedgerError> {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.create_token_asset_type(TokenAssetType {
            name: TOKEN_TYPE.into(),
            issuer: "Central Bank".into(),
            value: 1,
        })?;

        let registry = Arc::new(HtlcRegistry::new());
        let bus = Arc::new(EventBus::default());
        let ctx = HtlcContext::new(registry.clone(), ledger.clone(), bus.clone(), clock.clone());

        Ok(Self {
            bonds: BondHtlc::new(ctx.clone()),
            tokens: FungibleHtlc::new(ctx),
            ledger,
            registry,
            bus,
            clock,
        })
    }

    pub fn now(&self) -> u64 {
        self.clock.now_secs()
    }

    /// Create a bond owned by `owner`.
    pub fn bond(&self, asset_id: &str, owner: &Identity) -> Result<(), LedgerError> {
        self.ledger.create_asset(BondAsset {
            asset_type: BOND_TYPE.into(),
            id: asset_id.into(),
            owner: owner.clone(),
            issuer: "Treasury".into(),
            face_value: 500,
            maturity: "02 Dec 29 15:04 MST".into(),
            locked: false,
        })
    }

    pub fn issue(&self, owner: &Identity, units: u64) -> Result<(), LedgerError> {
        self.ledger.issue_tokens(TOKEN_TYPE, owner, units)
    }
}
