use thiserror::Error;

/// Bitcoin SV codec, key and transaction errors.
///
/// Every parsing variant carries the offending value so callers can report
/// exactly what was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BsvError {
    #[error("invalid base58 character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error(
        "checksum mismatch: expected {}, got {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    ChecksumMismatch { expected: [u8; 4], actual: [u8; 4] },

    #[error("base58check payload too short: {length} bytes")]
    PayloadTooShort { length: usize },

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("unsupported network prefix 0x{prefix:02x} for private key")]
    UnsupportedNetwork { prefix: u8 },

    #[error("unrecognized address network prefix 0x{prefix:02x}")]
    UnrecognizedAddressNetwork { prefix: u8 },

    #[error("invalid public key length: {0} bytes (expected 33 or 65)")]
    InvalidPublicKeyLength(usize),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid WIF: {0}")]
    InvalidWif(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("insufficient funds: need {needed} sat, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("malformed script: {0}")]
    MalformedScript(String),

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_character_names_the_character() {
        let err = BsvError::InvalidCharacter {
            character: '0',
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid base58 character '0' at position 3"
        );
    }

    #[test]
    fn display_checksum_mismatch_shows_both_checksums() {
        let err = BsvError::ChecksumMismatch {
            expected: [0xde, 0xad, 0xbe, 0xef],
            actual: [0x00, 0x01, 0x02, 0x03],
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected deadbeef, got 00010203"
        );
    }

    #[test]
    fn display_unsupported_network() {
        let err = BsvError::UnsupportedNetwork { prefix: 0x42 };
        assert_eq!(
            err.to_string(),
            "unsupported network prefix 0x42 for private key"
        );
    }

    #[test]
    fn display_insufficient_funds() {
        let err = BsvError::InsufficientFunds {
            needed: 100_000,
            available: 50_000,
        };
        assert!(err.to_string().contains("100000"));
        assert!(err.to_string().contains("50000"));
    }

    #[test]
    fn display_invalid_public_key_length() {
        let err = BsvError::InvalidPublicKeyLength(32);
        assert_eq!(
            err.to_string(),
            "invalid public key length: 32 bytes (expected 33 or 65)"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(BsvError::MalformedScript("push too large".into()));
        assert!(err.to_string().contains("push too large"));
    }
}
