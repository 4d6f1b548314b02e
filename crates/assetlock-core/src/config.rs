use serde::{Deserialize, Serialize};

/// Tunables for HTLC creation and event waiting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtlcConfig {
    /// Lock duration used when a caller does not pick one (seconds).
    #[serde(default = "default_lock_secs")]
    pub default_lock_secs: u64,
    /// Lock duration used by flows that exercise reclaim (seconds).
    #[serde(default = "default_short_lock_secs")]
    pub short_lock_secs: u64,
    /// How long a subscriber waits for an event before giving up (seconds).
    #[serde(default = "default_event_timeout_secs")]
    pub event_timeout_secs: u64,
    /// Upper bound on `expiry - now` accepted at lock time (seconds).
    #[serde(default = "default_max_lock_secs")]
    pub max_lock_secs: u64,
}

fn default_lock_secs() -> u64 {
    600
}
fn default_short_lock_secs() -> u64 {
    1
}
fn default_event_timeout_secs() -> u64 {
    20
}
fn default_max_lock_secs() -> u64 {
    30 * 24 * 60 * 60
}

impl Default for HtlcConfig {
    fn default() -> Self {
        Self {
            default_lock_secs: default_lock_secs(),
            short_lock_secs: default_short_lock_secs(),
            event_timeout_secs: default_event_timeout_secs(),
            max_lock_secs: default_max_lock_secs(),
        }
    }
}
