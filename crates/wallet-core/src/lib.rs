//! Bitcoin SV wallet service.
//!
//! Ties the `chain-bsv` transaction engine to a [`WalletRepository`] for
//! state, [`ChainServices`] for the network and a [`KeyVault`] that keeps
//! private keys sealed at rest.

pub mod config;
pub mod error;
pub mod repository;
pub mod services;
pub mod types;
pub mod vault;
pub mod wallet;

pub use config::WalletConfig;
pub use error::WalletError;
pub use repository::{MemoryRepository, WalletRepository};
pub use services::{
    BroadcastResponse, Broadcaster, ChainServices, RemoteOutput, RemoteTransaction, RemoteUtxo,
    TxLookup, UtxoLookup,
};
pub use types::{Direction, HistoryEntry, KeyRecord, UtxoRecord};
pub use vault::KeyVault;
pub use wallet::Wallet;
