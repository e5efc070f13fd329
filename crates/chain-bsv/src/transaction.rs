//! Transaction model and wire serialization.
//!
//! Layout: version(4 LE) | varint(n_in) | inputs | varint(n_out) | outputs | lock_time(4 LE)

use crate::encoding::{write_compact_size, ByteReader};
use crate::error::BsvError;
use crate::hash::double_sha256;
use crate::script;

pub const TX_VERSION: u32 = 1;
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;
pub const LOCK_TIME: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    /// Previous transaction hash (32 bytes, internal byte order).
    pub prev_txid: [u8; 32],
    pub prev_vout: u32,
    /// Empty until the input is signed.
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxInput {
    pub fn new(prev_txid: [u8; 32], prev_vout: u32) -> Self {
        Self {
            prev_txid,
            prev_vout,
            script_sig: Vec::new(),
            sequence: SEQUENCE_FINAL,
        }
    }

    /// txid ++ vout, the outpoint committed to by `hashPrevouts`.
    pub fn outpoint(&self) -> [u8; 36] {
        let mut out = [0u8; 36];
        out[..32].copy_from_slice(&self.prev_txid);
        out[32..].copy_from_slice(&self.prev_vout.to_le_bytes());
        out
    }

    /// Previous txid in display (big-endian hex) order.
    pub fn prev_txid_hex(&self) -> String {
        txid_to_hex(&self.prev_txid)
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.outpoint());
        write_compact_size(buf, self.script_sig.len() as u64);
        buf.extend_from_slice(&self.script_sig);
        buf.extend_from_slice(&self.sequence.to_le_bytes());
    }

    fn read(reader: &mut ByteReader<'_>) -> Result<Self, BsvError> {
        Ok(Self {
            prev_txid: reader.read_array()?,
            prev_vout: reader.read_u32_le()?,
            script_sig: reader.read_var_bytes()?.to_vec(),
            sequence: reader.read_u32_le()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub amount: u64,
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    pub fn p2pkh(pubkey_hash: &[u8; 20], amount: u64) -> Self {
        Self {
            amount,
            script_pubkey: script::p2pkh_lock_script(pubkey_hash),
        }
    }

    /// Zero-value `OP_FALSE OP_RETURN <payload>` output.
    pub fn data(payload: &[u8]) -> Result<Self, BsvError> {
        Ok(Self {
            amount: 0,
            script_pubkey: script::data_lock_script(payload)?,
        })
    }

    pub fn is_data(&self) -> bool {
        self.script_pubkey.starts_with(&[script::OP_FALSE, script::OP_RETURN])
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.amount.to_le_bytes());
        write_compact_size(buf, self.script_pubkey.len() as u64);
        buf.extend_from_slice(&self.script_pubkey);
    }

    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, BsvError> {
        Ok(Self {
            amount: reader.read_u64_le()?,
            script_pubkey: reader.read_var_bytes()?.to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + 1 + self.script_pubkey.len());
        self.write(&mut buf);
        buf
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: TX_VERSION,
            inputs,
            outputs,
            lock_time: LOCK_TIME,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.serialize_inputs());
        write_compact_size(&mut buf, self.outputs.len() as u64);
        buf.extend_from_slice(&self.serialize_outputs());
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// varint(n_in) followed by every input.
    pub fn serialize_inputs(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_compact_size(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            input.write(&mut buf);
        }
        buf
    }

    /// Every output back to back, without the count prefix. This is the
    /// byte string hashed into `hashOutputs`.
    pub fn serialize_outputs(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for output in &self.outputs {
            output.write(&mut buf);
        }
        buf
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    /// Parse wire bytes. The whole buffer must be consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BsvError> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_u32_le()?;
        let inputs = read_inputs(&mut reader)?;

        let n_out = reader.read_compact_size()?;
        let outputs = (0..n_out)
            .map(|_| TxOutput::read(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;

        let lock_time = reader.read_u32_le()?;
        reader.finish()?;

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    pub fn from_hex(raw_hex: &str) -> Result<Self, BsvError> {
        let bytes = hex::decode(raw_hex)
            .map_err(|e| BsvError::MalformedTransaction(format!("invalid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// reverse(double_sha256(serialization)) as hex.
    pub fn txid(&self) -> String {
        txid_to_hex(&double_sha256(&self.serialize()))
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        self.serialize().len()
    }
}

/// Parse a varint-prefixed input list, as found after the version field.
pub fn read_inputs(reader: &mut ByteReader<'_>) -> Result<Vec<TxInput>, BsvError> {
    let n_in = reader.read_compact_size()?;
    (0..n_in).map(|_| TxInput::read(reader)).collect()
}

/// Parse a hex txid string (big-endian display) to internal byte order (little-endian).
pub fn parse_txid(txid_hex: &str) -> Result<[u8; 32], BsvError> {
    let bytes = hex::decode(txid_hex)
        .map_err(|e| BsvError::TransactionBuildError(format!("invalid txid hex: {e}")))?;
    let mut result: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        BsvError::TransactionBuildError(format!("txid must be 32 bytes, got {}", bytes.len()))
    })?;
    result.reverse();
    Ok(result)
}

/// Internal-order hash to display hex.
pub fn txid_to_hex(hash: &[u8; 32]) -> String {
    let mut display = *hash;
    display.reverse();
    hex::encode(display)
}

/// Transaction id of a raw hex transaction.
pub fn calc_txid(raw_hex: &str) -> Result<String, BsvError> {
    let bytes = hex::decode(raw_hex)
        .map_err(|e| BsvError::MalformedTransaction(format!("invalid hex: {e}")))?;
    Ok(txid_to_hex(&double_sha256(&bytes)))
}
