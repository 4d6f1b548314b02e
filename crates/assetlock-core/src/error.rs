use crate::state_machine::HtlcStatus;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: HtlcStatus,
        to: HtlcStatus,
    },

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}
