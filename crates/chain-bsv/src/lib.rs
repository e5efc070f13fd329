//! Bitcoin SV chain support for the wallet.
//!
//! Provides the Base58Check codec, secp256k1 keys with WIF and P2PKH
//! addresses, script and wire-format primitives, the FORKID signature hash,
//! fee/dust policy, and a builder that turns spendable outputs into signed
//! raw transactions, including the two-party partial-signing payment flow.

pub mod address;
pub mod base58;
pub mod builder;
pub mod cooperative;
pub mod encoding;
pub mod error;
pub mod fee;
pub mod hash;
pub mod keys;
pub mod network;
pub mod script;
pub mod sighash;
pub mod transaction;

pub use builder::{BuiltTransaction, Destination, Spend, UnspentOutput};
pub use cooperative::PartialTransaction;
pub use error::BsvError;
pub use fee::FeePolicy;
pub use keys::{PrivateKey, PublicKey, WifKey};
pub use network::BsvNetwork;
pub use sighash::SighashType;
pub use transaction::Transaction;
