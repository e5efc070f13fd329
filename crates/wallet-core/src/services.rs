//! Contracts for the remote services the wallet talks to.
//!
//! Transport, retries and endpoints belong to the implementations; the
//! wallet only sees these request/response shapes.

use chain_bsv::UnspentOutput;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Rejection messages that mean the transaction is already on its way.
const DUPLICATE_MARKERS: [&str; 3] = ["already known", "already in the mempool", "txn-already-known"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub success: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl BroadcastResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            error_message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
        }
    }

    /// The node rejected the transaction only because it has seen it before.
    pub fn is_duplicate(&self) -> bool {
        !self.success
            && self.error_message.as_deref().is_some_and(|msg| {
                let msg = msg.to_ascii_lowercase();
                DUPLICATE_MARKERS.iter().any(|marker| msg.contains(marker))
            })
    }

    /// Broadcast is idempotent: a duplicate counts as accepted.
    pub fn is_accepted(&self) -> bool {
        self.success || self.is_duplicate()
    }
}

/// An unspent output as reported by the indexer. Accepts both our field
/// names and the indexer's `tx_hash`/`tx_pos`/`value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUtxo {
    #[serde(alias = "tx_hash")]
    pub txid: String,
    #[serde(alias = "tx_pos")]
    pub output_index: u32,
    #[serde(alias = "value")]
    pub value_satoshis: u64,
}

impl From<RemoteUtxo> for UnspentOutput {
    fn from(remote: RemoteUtxo) -> Self {
        UnspentOutput {
            txid: remote.txid,
            output_index: remote.output_index,
            amount: remote.value_satoshis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOutput {
    pub value_satoshis: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTransaction {
    pub outputs: Vec<RemoteOutput>,
}

impl RemoteTransaction {
    pub fn output_value(&self, txid: &str, index: u32) -> Result<u64, WalletError> {
        self.outputs
            .get(index as usize)
            .map(|o| o.value_satoshis)
            .ok_or_else(|| {
                WalletError::Service(format!(
                    "transaction {txid} has no output {index} ({} outputs)",
                    self.outputs.len()
                ))
            })
    }
}

pub trait Broadcaster {
    fn broadcast(&self, raw_tx_hex: &str) -> Result<BroadcastResponse, WalletError>;
}

pub trait UtxoLookup {
    fn list_unspent(&self, address: &str) -> Result<Vec<RemoteUtxo>, WalletError>;
}

pub trait TxLookup {
    fn get_transaction(&self, txid: &str) -> Result<RemoteTransaction, WalletError>;
}

/// Everything the wallet needs from the network.
pub trait ChainServices: Broadcaster + UtxoLookup + TxLookup {}

impl<T: Broadcaster + UtxoLookup + TxLookup> ChainServices for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_accepted() {
        assert!(BroadcastResponse::accepted().is_accepted());
    }

    #[test]
    fn duplicates_are_accepted() {
        for msg in [
            "257: txn-already-known",
            "Transaction already in the mempool",
            "Already Known",
        ] {
            let response = BroadcastResponse::rejected(msg);
            assert!(response.is_duplicate(), "{msg}");
            assert!(response.is_accepted(), "{msg}");
        }
    }

    #[test]
    fn other_rejections_are_not_accepted() {
        let response = BroadcastResponse::rejected("66: insufficient priority");
        assert!(!response.is_accepted());
        assert!(!BroadcastResponse {
            success: false,
            error_message: None
        }
        .is_accepted());
    }

    #[test]
    fn remote_utxo_accepts_indexer_names() {
        let json = r#"{"height":0,"tx_pos":2,"tx_hash":"aa","value":1500}"#;
        let utxo: RemoteUtxo = serde_json::from_str(json).unwrap();
        assert_eq!(
            UnspentOutput::from(utxo),
            UnspentOutput {
                txid: "aa".into(),
                output_index: 2,
                amount: 1500
            }
        );
    }

    #[test]
    fn missing_output_is_a_service_error() {
        let tx = RemoteTransaction {
            outputs: vec![RemoteOutput { value_satoshis: 7 }],
        };
        assert_eq!(tx.output_value("t", 0).unwrap(), 7);
        assert!(matches!(tx.output_value("t", 1), Err(WalletError::Service(_))));
    }
}
