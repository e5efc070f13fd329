//! Assemble, sign and serialize P2PKH transactions.
//!
//! Every spend is signed before anything is returned. A failure on any input
//! discards the whole transaction.

use serde::{Deserialize, Serialize};

use crate::address;
use crate::error::BsvError;
use crate::fee::{self, FeePolicy};
use crate::keys::WifKey;
use crate::sighash::{self, SighashType};
use crate::transaction::{parse_txid, Transaction, TxInput, TxOutput};

/// An output available to be spent, identified by its display-order txid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: String,
    pub output_index: u32,
    pub amount: u64,
}

/// A UTXO paired with the key that controls it. The key is only borrowed
/// for the duration of the build.
#[derive(Debug, Clone)]
pub struct Spend<'k> {
    pub utxo: UnspentOutput,
    pub key: &'k WifKey,
}

impl<'k> Spend<'k> {
    pub fn new(utxo: UnspentOutput, key: &'k WifKey) -> Self {
        Self { utxo, key }
    }
}

/// What a transaction should pay to, besides change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// P2PKH payment of `amount` satoshis.
    Payment { address: String, amount: u64 },
    /// Zero-value `OP_FALSE OP_RETURN` output carrying the bytes.
    Data(Vec<u8>),
}

impl Destination {
    pub fn payment(address: impl Into<String>, amount: u64) -> Self {
        Destination::Payment {
            address: address.into(),
            amount,
        }
    }
}

/// A signed transaction ready to broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltTransaction {
    /// Hex-encoded wire serialization.
    pub raw_tx: String,
    pub txid: String,
    pub fee: u64,
    /// Satoshis leaving the wallet: inputs minus any change returned.
    pub amount: u64,
    /// The change output this transaction creates for the wallet, if any.
    pub created_utxo: Option<UnspentOutput>,
}

/// Sign every input of a transaction spending `spends` into `outputs`.
///
/// Inputs appear in the order of `spends`. Each is signed with its own key
/// and the given sighash type.
pub fn sign_transaction(
    spends: &[Spend<'_>],
    outputs: Vec<TxOutput>,
    sighash: SighashType,
) -> Result<Transaction, BsvError> {
    let mut tx = unsigned_transaction(spends, outputs)?;
    let script_sigs = spends
        .iter()
        .enumerate()
        .map(|(i, spend)| {
            sighash::sign_p2pkh_input(&tx, i, spend.key, spend.utxo.amount, sighash)
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (input, script_sig) in tx.inputs.iter_mut().zip(script_sigs) {
        input.script_sig = script_sig;
    }
    Ok(tx)
}

/// Pay `destinations`, returning anything above the dust threshold to
/// `change_address` as the last output.
///
/// The fee is estimated for the payment outputs plus one change output,
/// whether or not change ends up being added. Leftover at or below the dust
/// threshold is left to the miner.
pub fn create_transaction(
    spends: &[Spend<'_>],
    destinations: &[Destination],
    change_address: &str,
    policy: &FeePolicy,
) -> Result<BuiltTransaction, BsvError> {
    policy.validate()?;
    let change_hash = address::address_to_pubkey_hash(change_address)?;

    let mut outputs = Vec::with_capacity(destinations.len() + 1);
    let mut payments = 0usize;
    let mut op_return_size = 0usize;
    let mut total_out = 0u64;
    for destination in destinations {
        match destination {
            Destination::Payment { address, amount } => {
                if *amount == 0 {
                    return Err(BsvError::TransactionBuildError(format!(
                        "payment to {address} has zero amount"
                    )));
                }
                let hash = address::address_to_pubkey_hash(address)?;
                outputs.push(TxOutput::p2pkh(&hash, *amount));
                payments += 1;
                total_out = checked_sum(total_out, *amount)?;
            }
            Destination::Data(payload) => {
                outputs.push(TxOutput::data(payload)?);
                op_return_size += fee::op_return_size(payload)?;
            }
        }
    }

    let total_in = total_input(spends)?;
    let compressed = all_compressed(spends);
    let fee = policy.estimate_fee(spends.len(), payments + 1, compressed, op_return_size);
    let needed = checked_sum(total_out, fee)?;
    if total_in < needed {
        return Err(BsvError::InsufficientFunds {
            needed,
            available: total_in,
        });
    }

    let leftover = total_in - needed;
    let change_index = outputs.len() as u32;
    let change = if policy.is_dust(leftover) {
        None
    } else {
        outputs.push(TxOutput::p2pkh(&change_hash, leftover));
        Some(leftover)
    };

    let tx = sign_transaction(spends, outputs, SighashType::All)?;
    let txid = tx.txid();
    tracing::debug!(
        txid = %txid,
        inputs = spends.len(),
        fee,
        change = change.unwrap_or(0),
        "built payment transaction"
    );

    Ok(BuiltTransaction {
        raw_tx: tx.to_hex(),
        created_utxo: change.map(|amount| UnspentOutput {
            txid: txid.clone(),
            output_index: change_index,
            amount,
        }),
        amount: total_in - change.unwrap_or(0),
        txid,
        fee,
    })
}

/// Send everything in `spends`, less the fee, to `address` as one output.
pub fn sweep(
    spends: &[Spend<'_>],
    address: &str,
    policy: &FeePolicy,
) -> Result<BuiltTransaction, BsvError> {
    policy.validate()?;
    let hash = address::address_to_pubkey_hash(address)?;

    let total_in = total_input(spends)?;
    let fee = policy.estimate_fee(spends.len(), 1, all_compressed(spends), 0);
    if total_in <= fee {
        return Err(BsvError::InsufficientFunds {
            needed: fee.saturating_add(1),
            available: total_in,
        });
    }

    let outputs = vec![TxOutput::p2pkh(&hash, total_in - fee)];
    let tx = sign_transaction(spends, outputs, SighashType::All)?;
    let txid = tx.txid();
    tracing::debug!(txid = %txid, inputs = spends.len(), fee, "built sweep transaction");

    Ok(BuiltTransaction {
        raw_tx: tx.to_hex(),
        txid,
        fee,
        amount: total_in,
        created_utxo: None,
    })
}

pub(crate) fn unsigned_transaction(
    spends: &[Spend<'_>],
    outputs: Vec<TxOutput>,
) -> Result<Transaction, BsvError> {
    if spends.is_empty() {
        return Err(BsvError::TransactionBuildError("no inputs to spend".into()));
    }
    let inputs = spends
        .iter()
        .map(|spend| Ok(TxInput::new(parse_txid(&spend.utxo.txid)?, spend.utxo.output_index)))
        .collect::<Result<Vec<_>, BsvError>>()?;
    Ok(Transaction::new(inputs, outputs))
}

pub(crate) fn total_input(spends: &[Spend<'_>]) -> Result<u64, BsvError> {
    spends
        .iter()
        .try_fold(0u64, |acc, spend| checked_sum(acc, spend.utxo.amount))
}

pub(crate) fn checked_sum(a: u64, b: u64) -> Result<u64, BsvError> {
    a.checked_add(b)
        .ok_or_else(|| BsvError::TransactionBuildError("amount overflow".into()))
}

fn all_compressed(spends: &[Spend<'_>]) -> bool {
    spends.iter().all(|spend| spend.key.compressed)
}
