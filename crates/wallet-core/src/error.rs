//! Wallet error type, wrapping codec and crypto failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("BSV: {0}")]
    Bsv(#[from] chain_bsv::BsvError),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown address: {0}")]
    UnknownAddress(String),

    #[error("Key network mismatch: wallet is {expected}, key is {actual}")]
    NetworkMismatch {
        expected: chain_bsv::BsvNetwork,
        actual: chain_bsv::BsvNetwork,
    },

    #[error("No spendable outputs")]
    NoSpendableOutputs,

    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(String),

    #[error("Chain service failed: {0}")]
    Service(String),

    #[error("Storage failed: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crypto_utils::CryptoError> for WalletError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        match e {
            crypto_utils::CryptoError::UnsealFailed(msg) => WalletError::DecryptionFailed(msg),
            other => WalletError::EncryptionFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::Internal(format!("JSON: {e}"))
    }
}
