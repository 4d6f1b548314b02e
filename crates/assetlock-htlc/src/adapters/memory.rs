use assetlock_core::{AssetKey, Identity};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use crate::error::LedgerError;
use crate::traits::AssetLedger;
use crate::types::{BondAsset, TokenAssetType};

/// Ledger calls that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    ReadAsset,
    TransferAsset,
    TransferEscrowed,
    MarkLocked,
    MarkUnlocked,
    Balance,
    DebitBalance,
    CreditBalance,
}

/// In-memory asset ledger.
///
/// Holds unique assets, token types and per-owner token balances. Useful for
/// tests, simulations and the demo runner, where no external ledger is
/// available. `fail_next` arms a one-shot failure for a given call so the
/// engine's rollback paths can be exercised.
pub struct MemoryLedger {
    /// Unique assets keyed by (type, id).
    assets: DashMap<AssetKey, BondAsset>,
    /// Token types keyed by name.
    token_types: DashMap<String, TokenAssetType>,
    /// Balance tracker: (token type, owner) -> units.
    balances: DashMap<(String, Identity), u64>,
    failures: DashSet<LedgerOp>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            assets: DashMap::new(),
            token_types: DashMap::new(),
            balances: DashMap::new(),
            failures: DashSet::new(),
        }
    }

    /// Make the next call of `op` fail with `LedgerError::Internal`.
    pub fn fail_next(&self, op: LedgerOp) {
        self.failures.insert(op);
    }

    fn check_failure(&self, op: LedgerOp) -> Result<(), LedgerError> {
        if self.failures.remove(&op).is_some() {
            tracing::debug!(?op, "injected ledger failure");
            return Err(LedgerError::Internal(format!("{:?} unavailable", op)));
        }
        Ok(())
    }

    /// Register a new unique asset.
    pub fn create_asset(&self, asset: BondAsset) -> Result<(), LedgerError> {
        let key = asset.key();
        match self.assets.entry(key.clone()) {
            Entry::Occupied(_) => Err(LedgerError::AssetExists(key)),
            Entry::Vacant(slot) => {
                slot.insert(asset);
                tracing::info!(asset = %key, "asset created");
                Ok(())
            }
        }
    }

    /// Snapshot of every unique asset.
    pub fn all_assets(&self) -> Vec<BondAsset> {
        self.assets.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Register a new token type.
    pub fn create_token_asset_type(&self, token_type: TokenAssetType) -> Result<(), LedgerError> {
        let name = token_type.name.clone();
        match self.token_types.entry(name.clone()) {
            Entry::Occupied(_) => Err(LedgerError::TokenTypeExists(name)),
            Entry::Vacant(slot) => {
                slot.insert(token_type);
                tracing::info!(token_type = %name, "token asset type created");
                Ok(())
            }
        }
    }

    pub fn token_asset_type(&self, name: &str) -> Result<TokenAssetType, LedgerError> {
        self.token_types
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LedgerError::TokenTypeNotFound(name.to_string()))
    }

    /// Mint `units` of `token_type` to `owner`.
    pub fn issue_tokens(
        &self,
        token_type: &str,
        owner: &Identity,
        units: u64,
    ) -> Result<(), LedgerError> {
        self.require_token_type(token_type)?;
        self.add(token_type, owner, units)?;
        tracing::info!(token_type, owner = %owner, units, "tokens issued");
        Ok(())
    }

    fn require_token_type(&self, token_type: &str) -> Result<(), LedgerError> {
        if self.token_types.contains_key(token_type) {
            Ok(())
        } else {
            Err(LedgerError::TokenTypeNotFound(token_type.to_string()))
        }
    }

    fn add(&self, token_type: &str, owner: &Identity, units: u64) -> Result<(), LedgerError> {
        let mut balance = self
            .balances
            .entry((token_type.to_string(), owner.clone()))
            .or_insert(0);
        *balance = balance
            .checked_add(units)
            .ok_or_else(|| LedgerError::BalanceOverflow(token_type.to_string()))?;
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLedger for MemoryLedger {
    fn read_asset(&self, key: &AssetKey) -> Result<BondAsset, LedgerError> {
        self.check_failure(LedgerOp::ReadAsset)?;
        self.assets
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LedgerError::AssetNotFound(key.clone()))
    }

    fn transfer_asset(
        &self,
        key: &AssetKey,
        from: &Identity,
        to: &Identity,
    ) -> Result<(), LedgerError> {
        self.check_failure(LedgerOp::TransferAsset)?;
        let mut asset = self
            .assets
            .get_mut(key)
            .ok_or_else(|| LedgerError::AssetNotFound(key.clone()))?;
        if asset.locked {
            return Err(LedgerError::AssetLocked(key.clone()));
        }
        if &asset.owner != from {
            return Err(LedgerError::NotOwner {
                asset: key.clone(),
                owner: from.clone(),
            });
        }
        asset.owner = to.clone();
        tracing::debug!(asset = %key, to = %to, "asset transferred");
        Ok(())
    }

    fn transfer_escrowed(
        &self,
        key: &AssetKey,
        from: &Identity,
        to: &Identity,
    ) -> Result<(), LedgerError> {
        self.check_failure(LedgerOp::TransferEscrowed)?;
        let mut asset = self
            .assets
            .get_mut(key)
            .ok_or_else(|| LedgerError::AssetNotFound(key.clone()))?;
        if !asset.locked {
            return Err(LedgerError::AssetNotLocked(key.clone()));
        }
        if &asset.owner != from {
            return Err(LedgerError::NotOwner {
                asset: key.clone(),
                owner: from.clone(),
            });
        }
        asset.owner = to.clone();
        asset.locked = false;
        tracing::debug!(asset = %key, to = %to, "escrowed asset released");
        Ok(())
    }

    fn mark_locked(&self, key: &AssetKey) -> Result<(), LedgerError> {
        self.check_failure(LedgerOp::MarkLocked)?;
        let mut asset = self
            .assets
            .get_mut(key)
            .ok_or_else(|| LedgerError::AssetNotFound(key.clone()))?;
        if asset.locked {
            return Err(LedgerError::AssetLocked(key.clone()));
        }
        asset.locked = true;
        Ok(())
    }

    fn mark_unlocked(&self, key: &AssetKey) -> Result<(), LedgerError> {
        self.check_failure(LedgerOp::MarkUnlocked)?;
        let mut asset = self
            .assets
            .get_mut(key)
            .ok_or_else(|| LedgerError::AssetNotFound(key.clone()))?;
        if !asset.locked {
            return Err(LedgerError::AssetNotLocked(key.clone()));
        }
        asset.locked = false;
        Ok(())
    }

    fn balance(&self, token_type: &str, owner: &Identity) -> Result<u64, LedgerError> {
        self.check_failure(LedgerOp::Balance)?;
        self.require_token_type(token_type)?;
        Ok(self
            .balances
            .get(&(token_type.to_string(), owner.clone()))
            .map(|b| *b)
            .unwrap_or(0))
    }

    fn debit_balance(
        &self,
        token_type: &str,
        owner: &Identity,
        quantity: u64,
    ) -> Result<(), LedgerError> {
        self.check_failure(LedgerOp::DebitBalance)?;
        self.require_token_type(token_type)?;
        let mut balance = self
            .balances
            .entry((token_type.to_string(), owner.clone()))
            .or_insert(0);
        if *balance < quantity {
            return Err(LedgerError::InsufficientFunds {
                available: *balance,
                required: quantity,
            });
        }
        *balance -= quantity;
        Ok(())
    }

    fn credit_balance(
        &self,
        token_type: &str,
        owner: &Identity,
        quantity: u64,
    ) -> Result<(), LedgerError> {
        self.check_failure(LedgerOp::CreditBalance)?;
        self.require_token_type(token_type)?;
        self.add(token_type, owner, quantity)
    }
}
