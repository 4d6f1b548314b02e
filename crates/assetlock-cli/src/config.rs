//! CLI configuration loading and management.

use assetlock_core::HtlcConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full configuration for the `assetlock` binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssetLockConfig {
    /// HTLC timing settings.
    #[serde(default)]
    pub htlc: HtlcConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Demo runner settings.
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Secret the recipient reveals to claim.
    #[serde(default = "default_preimage")]
    pub preimage: String,
    /// Asset type used for bond assets.
    #[serde(default = "default_bond_asset_type")]
    pub bond_asset_type: String,
    /// Token type used by the fungible flows.
    #[serde(default = "default_token_asset_type")]
    pub token_asset_type: String,
    /// Units locked per fungible flow.
    #[serde(default = "default_token_units")]
    pub token_units: u64,
    /// Units issued to the locker before each fungible flow.
    #[serde(default = "default_token_issue_units")]
    pub token_issue_units: u64,
    /// Certificate label of the locking party.
    #[serde(default = "default_locker")]
    pub locker: String,
    /// Certificate label of the receiving party.
    #[serde(default = "default_recipient")]
    pub recipient: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_preimage() -> String {
    "abcd".into()
}
fn default_bond_asset_type() -> String {
    "t1".into()
}
fn default_token_asset_type() -> String {
    "token1".into()
}
fn default_token_units() -> u64 {
    5
}
fn default_token_issue_units() -> u64 {
    6
}
fn default_locker() -> String {
    "Admin@org1.network1.com".into()
}
fn default_recipient() -> String {
    "User1@org1.network1.com".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            preimage: default_preimage(),
            bond_asset_type: default_bond_asset_type(),
            token_asset_type: default_token_asset_type(),
            token_units: default_token_units(),
            token_issue_units: default_token_issue_units(),
            locker: default_locker(),
            recipient: default_recipient(),
        }
    }
}

impl AssetLockConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: AssetLockConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
