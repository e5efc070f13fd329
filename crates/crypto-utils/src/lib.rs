//! # crypto-utils
//!
//! Secure randomness, password-based key derivation and authenticated
//! encryption used by the wallet to keep private keys sealed at rest.

pub mod encryption;
pub mod error;
pub mod kdf;
pub mod random;

pub use error::CryptoError;
pub use kdf::KdfParams;
