//! FORKID signature hash (BIP-143 style preimage) and P2PKH input signing.
//!
//! Preimage for input `i`:
//!
//! ```text
//! version | hashPrevouts | hashSequence | outpoint_i | varint(len) scriptCode
//! | amount_i | sequence_i | hashOutputs | lock_time | sighash_type (4 LE)
//! ```
//!
//! The digest handed to ECDSA is a single SHA-256 of the preimage. The
//! component hashes inside the preimage are double SHA-256.

use crate::encoding::write_compact_size;
use crate::error::BsvError;
use crate::hash::{double_sha256, sha256};
use crate::keys::{PublicKey, WifKey};
use crate::script;
use crate::transaction::Transaction;

/// Fork identification flag OR'd into every sighash type.
pub const SIGHASH_FORKID: u32 = 0x40;

/// Which outputs a signature commits to. The FORKID flag is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SighashType {
    /// Every output.
    All,
    /// No outputs.
    None,
    /// Only the output at the same index as the input.
    Single,
}

impl SighashType {
    fn base(self) -> u32 {
        match self {
            SighashType::All => 0x01,
            SighashType::None => 0x02,
            SighashType::Single => 0x03,
        }
    }

    /// Full 32-bit type written at the end of the preimage (0x41/0x42/0x43).
    pub fn value(self) -> u32 {
        self.base() | SIGHASH_FORKID
    }

    /// Byte appended to the DER signature in the scriptSig.
    pub fn byte(self) -> u8 {
        self.value() as u8
    }

    /// Inverse of [`SighashType::byte`]. Types without FORKID are rejected.
    pub fn from_byte(byte: u8) -> Option<Self> {
        [SighashType::All, SighashType::None, SighashType::Single]
            .into_iter()
            .find(|t| t.byte() == byte)
    }
}

/// Build the signature preimage for `input_index`.
///
/// `script_code` is the P2PKH locking script of the key that controls the
/// input and `amount` the value of the output being spent.
pub fn preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    amount: u64,
    sighash: SighashType,
) -> Result<Vec<u8>, BsvError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        BsvError::TransactionBuildError(format!(
            "input index {input_index} out of range ({} inputs)",
            tx.inputs.len()
        ))
    })?;

    let hash_prevouts = {
        let mut data = Vec::with_capacity(tx.inputs.len() * 36);
        for inp in &tx.inputs {
            data.extend_from_slice(&inp.outpoint());
        }
        double_sha256(&data)
    };

    let hash_sequence = match sighash {
        SighashType::All => {
            let mut data = Vec::with_capacity(tx.inputs.len() * 4);
            for inp in &tx.inputs {
                data.extend_from_slice(&inp.sequence.to_le_bytes());
            }
            double_sha256(&data)
        }
        SighashType::None | SighashType::Single => [0u8; 32],
    };

    let hash_outputs = match sighash {
        SighashType::All => double_sha256(&tx.serialize_outputs()),
        SighashType::Single => match tx.outputs.get(input_index) {
            Some(output) => double_sha256(&output.serialize()),
            None => [0u8; 32],
        },
        SighashType::None => [0u8; 32],
    };

    let mut data = Vec::with_capacity(156 + script_code.len());
    data.extend_from_slice(&tx.version.to_le_bytes());
    data.extend_from_slice(&hash_prevouts);
    data.extend_from_slice(&hash_sequence);
    data.extend_from_slice(&input.outpoint());
    write_compact_size(&mut data, script_code.len() as u64);
    data.extend_from_slice(script_code);
    data.extend_from_slice(&amount.to_le_bytes());
    data.extend_from_slice(&input.sequence.to_le_bytes());
    data.extend_from_slice(&hash_outputs);
    data.extend_from_slice(&tx.lock_time.to_le_bytes());
    data.extend_from_slice(&sighash.value().to_le_bytes());
    Ok(data)
}

/// The 32-byte digest that is actually signed: SHA256(preimage).
pub fn signature_digest(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    amount: u64,
    sighash: SighashType,
) -> Result<[u8; 32], BsvError> {
    Ok(sha256(&preimage(tx, input_index, script_code, amount, sighash)?))
}

/// Sign `input_index` of `tx` with `key` and return its P2PKH scriptSig.
///
/// The transaction itself is not modified.
pub fn sign_p2pkh_input(
    tx: &Transaction,
    input_index: usize,
    key: &WifKey,
    amount: u64,
    sighash: SighashType,
) -> Result<Vec<u8>, BsvError> {
    let public_key = key.public_key();
    let script_code = script::p2pkh_lock_script(&public_key.hash160());
    let digest = signature_digest(tx, input_index, &script_code, amount, sighash)?;

    let mut signature = key.key.sign(&digest)?;
    signature.push(sighash.byte());

    tracing::debug!(
        input = input_index,
        sighash = ?sighash,
        amount,
        "signed P2PKH input"
    );
    Ok(script::p2pkh_unlock_script(&signature, public_key.as_bytes()))
}

/// Check the signature in a signed P2PKH input against its own public key.
///
/// The preimage is rebuilt from the sighash byte carried by the signature,
/// so inputs signed with SINGLE or NONE stay valid after outputs they do
/// not commit to are appended. Returns the sighash type that was used.
pub fn verify_p2pkh_input(
    tx: &Transaction,
    input_index: usize,
    amount: u64,
) -> Result<SighashType, BsvError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        BsvError::TransactionBuildError(format!("input index {input_index} out of range"))
    })?;

    let (signature, pubkey) = script::parse_p2pkh_unlock_script(&input.script_sig)?;
    let Some((&type_byte, der)) = signature.split_last() else {
        return Err(BsvError::MalformedScript("empty signature push".into()));
    };
    let sighash = SighashType::from_byte(type_byte).ok_or_else(|| {
        BsvError::SigningError(format!(
            "input {input_index} uses unsupported sighash type 0x{type_byte:02x}"
        ))
    })?;

    let public_key = PublicKey::from_bytes(&pubkey)?;
    let script_code = script::p2pkh_lock_script(&public_key.hash160());
    let digest = signature_digest(tx, input_index, &script_code, amount, sighash)?;

    if !public_key.verify(&digest, der) {
        return Err(BsvError::SigningError(format!(
            "signature on input {input_index} does not verify"
        )));
    }
    Ok(sighash)
}
