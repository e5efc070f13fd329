//! Wallet configuration, loaded from JSON.

use std::path::Path;

use chain_bsv::{BsvNetwork, FeePolicy};
use crypto_utils::KdfParams;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Wallet settings. Every field is optional in JSON and falls back to its
/// default: mainnet, 0.5 sat/byte with a 546 sat dust threshold, and the
/// standard Argon2id cost.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub network: BsvNetwork,
    pub fee_policy: FeePolicy,
    pub kdf: KdfParams,
}

impl WalletConfig {
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        let config: WalletConfig = serde_json::from_str(json)
            .map_err(|e| WalletError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| WalletError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        self.fee_policy
            .validate()
            .map_err(|e| WalletError::InvalidConfig(e.to_string()))
    }
}
