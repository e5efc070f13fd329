//! Records the wallet stores: sealed keys, spendable outputs and history.

use chain_bsv::UnspentOutput;
use serde::{Deserialize, Serialize};

/// A controlled address and its sealed WIF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub address: String,
    /// AES-256-GCM sealed WIF, bound to `address`.
    pub sealed_wif: Vec<u8>,
    /// The address currently handed out for receiving.
    pub active: bool,
}

/// A spendable output held by one of the wallet's addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtxoRecord {
    pub txid: String,
    pub output_index: u32,
    pub amount: u64,
    /// Address whose key unlocks this output.
    pub address: String,
}

impl UtxoRecord {
    pub fn new(utxo: UnspentOutput, address: impl Into<String>) -> Self {
        Self {
            txid: utxo.txid,
            output_index: utxo.output_index,
            amount: utxo.amount,
            address: address.into(),
        }
    }

    pub fn outpoint(&self) -> (&str, u32) {
        (&self.txid, self.output_index)
    }

    pub fn to_unspent(&self) -> UnspentOutput {
        UnspentOutput {
            txid: self.txid.clone(),
            output_index: self.output_index,
            amount: self.amount,
        }
    }
}

/// Direction of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Received,
    Sent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub txid: String,
    pub amount: u64,
    /// Raw transaction hex, when the wallet built or completed it.
    pub raw_tx: Option<String>,
    pub direction: Direction,
}
