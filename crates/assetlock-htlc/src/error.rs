use assetlock_core::{AssetKey, ContractId, HtlcStatus, Identity};

/// Failures reported by the asset ledger collaborator.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("asset not found: {0}")]
    AssetNotFound(AssetKey),

    #[error("asset already exists: {0}")]
    AssetExists(AssetKey),

    #[error("asset is locked: {0}")]
    AssetLocked(AssetKey),

    #[error("asset is not locked: {0}")]
    AssetNotLocked(AssetKey),

    #[error("{owner} does not own asset {asset}")]
    NotOwner { asset: AssetKey, owner: Identity },

    #[error("token asset type not found: {0}")]
    TokenTypeNotFound(String),

    #[error("token asset type already exists: {0}")]
    TokenTypeExists(String),

    #[error("insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("balance overflow for token type {0}")]
    BalanceOverflow(String),

    #[error("ledger failure: {0}")]
    Internal(String),
}

/// HTLC operation errors.
#[derive(Debug, thiserror::Error)]
pub enum HtlcError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("htlc already exists: {0}")]
    Conflict(String),

    #[error("htlc not found: {0}")]
    NotFound(String),

    #[error("htlc {contract_id} is {status}, not Locked")]
    InvalidState {
        contract_id: ContractId,
        status: HtlcStatus,
    },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("htlc expired: {0}")]
    Expired(ContractId),

    #[error("htlc not expired yet: {0}")]
    NotYetExpired(ContractId),

    #[error("preimage does not match hash lock of htlc {0}")]
    BadPreimage(ContractId),

    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u64, required: u64 },

    #[error("ledger failure: {0}")]
    LedgerFailure(LedgerError),
}

impl From<LedgerError> for HtlcError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                available,
                required,
            } => Self::InsufficientBalance {
                available,
                required,
            },
            other => Self::LedgerFailure(other),
        }
    }
}
