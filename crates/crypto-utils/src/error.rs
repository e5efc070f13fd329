use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("sealing failed: {0}")]
    SealFailed(String),

    #[error("unsealing failed: {0}")]
    UnsealFailed(String),

    #[error("key derivation failed: {0}")]
    KdfFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_seal_failed() {
        let err = CryptoError::SealFailed("aead seal error".into());
        assert_eq!(err.to_string(), "sealing failed: aead seal error");
    }

    #[test]
    fn display_unseal_failed() {
        let err = CryptoError::UnsealFailed("tag mismatch".into());
        assert_eq!(err.to_string(), "unsealing failed: tag mismatch");
    }

    #[test]
    fn display_kdf_failed() {
        let err = CryptoError::KdfFailed("out of memory".into());
        assert_eq!(err.to_string(), "key derivation failed: out of memory");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CryptoError::InvalidInput("short".into()));
        assert!(err.to_string().contains("short"));
    }
}
