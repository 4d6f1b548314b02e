use assetlock_core::{AssetKey, Identity};

use crate::error::LedgerError;
use crate::events::HtlcEvent;
use crate::types::BondAsset;

/// Asset ledger interface.
///
/// Implementations bridge the HTLC engine to the ledger that actually holds
/// asset ownership and token balances. Each call is expected to be atomic on
/// its own; the controllers compose them into one unit of work per HTLC
/// transition.
pub trait AssetLedger: Send + Sync {
    /// Read a unique asset.
    fn read_asset(&self, key: &AssetKey) -> Result<BondAsset, LedgerError>;

    /// Move ownership of an unlocked asset from `from` to `to`.
    fn transfer_asset(
        &self,
        key: &AssetKey,
        from: &Identity,
        to: &Identity,
    ) -> Result<(), LedgerError>;

    /// Hand an escrowed asset from `from` to `to` and clear its flag in one
    /// step. Fails without change unless the asset is locked and owned by
    /// `from`.
    fn transfer_escrowed(
        &self,
        key: &AssetKey,
        from: &Identity,
        to: &Identity,
    ) -> Result<(), LedgerError>;

    /// Flag an asset as escrowed by an HTLC.
    fn mark_locked(&self, key: &AssetKey) -> Result<(), LedgerError>;

    /// Clear the escrow flag of an asset.
    fn mark_unlocked(&self, key: &AssetKey) -> Result<(), LedgerError>;

    /// Spendable balance of `owner` for a token type.
    fn balance(&self, token_type: &str, owner: &Identity) -> Result<u64, LedgerError>;

    /// Remove `quantity` units from `owner`; fails without change if short.
    fn debit_balance(
        &self,
        token_type: &str,
        owner: &Identity,
        quantity: u64,
    ) -> Result<(), LedgerError>;

    /// Add `quantity` units to `owner`.
    fn credit_balance(
        &self,
        token_type: &str,
        owner: &Identity,
        quantity: u64,
    ) -> Result<(), LedgerError>;
}

/// Receiver of HTLC events. Publishing is fire-and-forget.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: HtlcEvent);
}
