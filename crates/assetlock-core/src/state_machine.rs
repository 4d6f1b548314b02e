use std::fmt;

use crate::error::CoreError;

/// Lifecycle status of an HTLC record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HtlcStatus {
    /// Value is escrowed and awaiting claim or reclaim.
    Locked,
    /// The recipient revealed the preimage before expiry. Final state.
    Claimed,
    /// The locker took the value back after expiry. Final state.
    Reclaimed,
}

impl HtlcStatus {
    /// Whether this is a final (terminal) status.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Claimed | Self::Reclaimed)
    }

    /// Convert to the protobuf status enum value.
    pub fn to_proto_i32(&self) -> i32 {
        match self {
            Self::Locked => 1,
            Self::Claimed => 2,
            Self::Reclaimed => 3,
        }
    }

    /// Create from a protobuf status enum value.
    pub fn from_proto_i32(value: i32) -> Result<Self, CoreError> {
        match value {
            1 => Ok(Self::Locked),
            2 => Ok(Self::Claimed),
            3 => Ok(Self::Reclaimed),
            _ => Err(CoreError::ValidationError(format!(
                "invalid htlc status value: {}",
                value
            ))),
        }
    }
}

impl fmt::Display for HtlcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "Locked"),
            Self::Claimed => write!(f, "Claimed"),
            Self::Reclaimed => write!(f, "Reclaimed"),
        }
    }
}

/// Actions that move an HTLC out of `Locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtlcAction {
    /// Recipient presents the preimage.
    Claim,
    /// Locker takes the value back after expiry.
    Reclaim,
}

impl HtlcAction {
    fn target(&self) -> HtlcStatus {
        match self {
            Self::Claim => HtlcStatus::Claimed,
            Self::Reclaim => HtlcStatus::Reclaimed,
        }
    }
}

/// HTLC status transitions.
///
/// Valid transitions:
/// - Locked → Claimed (Claim)
/// - Locked → Reclaimed (Reclaim)
///
/// Claimed and Reclaimed are terminal.
pub struct HtlcStateMachine;

impl HtlcStateMachine {
    /// Attempt a status transition for an action.
    /// Returns the new status on success, or an error for invalid transitions.
    pub fn transition(current: HtlcStatus, action: HtlcAction) -> Result<HtlcStatus, CoreError> {
        let next = match (current, action) {
            (HtlcStatus::Locked, HtlcAction::Claim) => HtlcStatus::Claimed,
            (HtlcStatus::Locked, HtlcAction::Reclaim) => HtlcStatus::Reclaimed,
            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: action.target(),
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %next,
            action = ?action,
            "htlc status transition"
        );

        Ok(next)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: HtlcStatus, action: HtlcAction) -> bool {
        Self::transition(current, action).is_ok()
    }
}
