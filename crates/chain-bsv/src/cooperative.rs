//! Two-party payment with partially signed transactions.
//!
//! The payer signs input 0 with SINGLE|FORKID (committing to their change
//! output at index 0 only) and every other input with NONE|FORKID
//! (committing to no outputs). The payee can then append its own output at
//! index 1 without invalidating any payer signature.

use serde::{Deserialize, Serialize};

use crate::address;
use crate::builder::{self, BuiltTransaction, Spend, UnspentOutput};
use crate::encoding::ByteReader;
use crate::error::BsvError;
use crate::fee::{FeePolicy, DUST_THRESHOLD};
use crate::sighash::{self, SighashType};
use crate::transaction::{self, Transaction, TxOutput};

/// Hex fragments of a payer-signed transaction, as carried in a QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialTransaction {
    /// 4-byte little-endian version.
    pub version: String,
    /// varint(n_in) followed by the signed inputs.
    pub input: String,
    /// The payer's change output, without a count prefix.
    pub output: String,
    /// 4-byte little-endian lock time.
    pub lock_time: String,
}

impl PartialTransaction {
    /// Split a single-output transaction into its fragments.
    pub fn from_transaction(tx: &Transaction) -> Result<Self, BsvError> {
        let [output] = tx.outputs.as_slice() else {
            return Err(BsvError::TransactionBuildError(format!(
                "partial transaction must have exactly one output, has {}",
                tx.outputs.len()
            )));
        };
        Ok(Self {
            version: hex::encode(tx.version.to_le_bytes()),
            input: hex::encode(tx.serialize_inputs()),
            output: hex::encode(output.serialize()),
            lock_time: hex::encode(tx.lock_time.to_le_bytes()),
        })
    }

    /// Reassemble the fragments into a one-output transaction.
    pub fn to_transaction(&self) -> Result<Transaction, BsvError> {
        let version = u32::from_le_bytes(fixed_fragment("version", &self.version)?);
        let lock_time = u32::from_le_bytes(fixed_fragment("lock_time", &self.lock_time)?);

        let input_bytes = decode_fragment("input", &self.input)?;
        let mut reader = ByteReader::new(&input_bytes);
        let inputs = transaction::read_inputs(&mut reader)?;
        reader.finish()?;
        if inputs.is_empty() {
            return Err(BsvError::MalformedTransaction(
                "partial transaction has no inputs".into(),
            ));
        }

        let output_bytes = decode_fragment("output", &self.output)?;
        let mut reader = ByteReader::new(&output_bytes);
        let output = TxOutput::read(&mut reader)?;
        reader.finish()?;

        Ok(Transaction {
            version,
            inputs,
            outputs: vec![output],
            lock_time,
        })
    }

    /// `(txid, output_index)` of every input, txids in display order.
    pub fn outpoints(&self) -> Result<Vec<(String, u32)>, BsvError> {
        Ok(self
            .to_transaction()?
            .inputs
            .iter()
            .map(|input| (input.prev_txid_hex(), input.prev_vout))
            .collect())
    }
}

/// Payer side: authorize `authorized_amount` out of `spends`.
///
/// The only output returns `total - authorized_amount` to `change_address`.
/// The payee pays the network fee out of the authorized amount. That change
/// is signed with SINGLE and cannot be dropped later, so it must be above
/// [`DUST_THRESHOLD`].
pub fn generate_sighash_single_rawtx(
    spends: &[Spend<'_>],
    change_address: &str,
    authorized_amount: u64,
) -> Result<PartialTransaction, BsvError> {
    let change_hash = address::address_to_pubkey_hash(change_address)?;
    let total_in = builder::total_input(spends)?;
    if authorized_amount > total_in {
        return Err(BsvError::InsufficientFunds {
            needed: authorized_amount,
            available: total_in,
        });
    }

    let change_amount = total_in - authorized_amount;
    if change_amount <= DUST_THRESHOLD {
        return Err(BsvError::TransactionBuildError(format!(
            "change of {change_amount} sat is at or below the dust threshold of {DUST_THRESHOLD}"
        )));
    }

    let change = TxOutput::p2pkh(&change_hash, change_amount);
    let mut tx = builder::unsigned_transaction(spends, vec![change])?;

    let script_sigs = spends
        .iter()
        .enumerate()
        .map(|(i, spend)| {
            let sighash = if i == 0 {
                SighashType::Single
            } else {
                SighashType::None
            };
            sighash::sign_p2pkh_input(&tx, i, spend.key, spend.utxo.amount, sighash)
        })
        .collect::<Result<Vec<_>, _>>()?;
    for (input, script_sig) in tx.inputs.iter_mut().zip(script_sigs) {
        input.script_sig = script_sig;
    }

    tracing::debug!(
        inputs = spends.len(),
        authorized_amount,
        "signed partial transaction"
    );
    PartialTransaction::from_transaction(&tx)
}

/// Payee side: append an output paying `pay_to_address` whatever the payer
/// authorized, less the fee for the final transaction.
///
/// `input_amounts[i]` is the value of the output spent by input `i`, looked
/// up independently of the payer. Every payer signature is checked against
/// the final transaction before it is returned.
pub fn get_rawtx_to_pay(
    partial: &PartialTransaction,
    input_amounts: &[u64],
    pay_to_address: &str,
    policy: &FeePolicy,
) -> Result<BuiltTransaction, BsvError> {
    policy.validate()?;
    let pay_hash = address::address_to_pubkey_hash(pay_to_address)?;

    let mut tx = partial.to_transaction()?;
    if input_amounts.len() != tx.inputs.len() {
        return Err(BsvError::TransactionBuildError(format!(
            "{} input amounts for {} inputs",
            input_amounts.len(),
            tx.inputs.len()
        )));
    }

    let total_in = input_amounts
        .iter()
        .try_fold(0u64, |acc, &amount| builder::checked_sum(acc, amount))?;
    let committed = tx.outputs[0].amount;

    // The amount field is fixed width, so the size is known before the value.
    tx.outputs.push(TxOutput::p2pkh(&pay_hash, 0));
    let fee = policy.fee_for_size(tx.size());

    let reserved = builder::checked_sum(committed, fee)?;
    if total_in <= reserved {
        return Err(BsvError::InsufficientFunds {
            needed: reserved.saturating_add(1),
            available: total_in,
        });
    }
    let amount = total_in - reserved;
    tx.outputs[1].amount = amount;

    for (i, &input_amount) in input_amounts.iter().enumerate() {
        sighash::verify_p2pkh_input(&tx, i, input_amount)?;
    }

    let txid = tx.txid();
    tracing::debug!(txid = %txid, fee, amount, "completed partial transaction");

    Ok(BuiltTransaction {
        raw_tx: tx.to_hex(),
        created_utxo: Some(UnspentOutput {
            txid: txid.clone(),
            output_index: 1,
            amount,
        }),
        txid,
        fee,
        amount,
    })
}

fn decode_fragment(name: &str, fragment: &str) -> Result<Vec<u8>, BsvError> {
    hex::decode(fragment)
        .map_err(|e| BsvError::MalformedTransaction(format!("invalid {name} hex: {e}")))
}

fn fixed_fragment(name: &str, fragment: &str) -> Result<[u8; 4], BsvError> {
    let bytes = decode_fragment(name, fragment)?;
    bytes.as_slice().try_into().map_err(|_| {
        BsvError::MalformedTransaction(format!("{name} must be 4 bytes, got {}", bytes.len()))
    })
}
