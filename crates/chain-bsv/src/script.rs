//! Locking and unlocking script construction.

use crate::encoding::{write_compact_size, ByteReader};
use crate::error::BsvError;

pub const OP_FALSE: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;

/// Push of the 20-byte public-key hash inside a P2PKH script.
const PUSH_20: u8 = 0x14;

pub const P2PKH_SCRIPT_LEN: usize = 25;

/// Build a P2PKH scriptPubKey: OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG
pub fn p2pkh_lock_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = Vec::with_capacity(P2PKH_SCRIPT_LEN);
    script.push(OP_DUP);
    script.push(OP_HASH160);
    script.push(PUSH_20);
    script.extend_from_slice(pubkey_hash);
    script.push(OP_EQUALVERIFY);
    script.push(OP_CHECKSIG);
    script
}

/// Length prefix for pushing `len` bytes of data.
///
/// Lengths up to and including 0x4c are written as a single byte, then
/// OP_PUSHDATA1/2/4 with a 1/2/4-byte little-endian length.
pub fn pushdata_code(len: usize) -> Result<Vec<u8>, BsvError> {
    let code = if len <= 0x4c {
        vec![len as u8]
    } else if len <= 0xff {
        vec![OP_PUSHDATA1, len as u8]
    } else if len <= 0xffff {
        let mut code = vec![OP_PUSHDATA2];
        code.extend_from_slice(&(len as u16).to_le_bytes());
        code
    } else {
        let len = u32::try_from(len).map_err(|_| {
            BsvError::MalformedScript(format!("push of {len} bytes exceeds OP_PUSHDATA4"))
        })?;
        let mut code = vec![OP_PUSHDATA4];
        code.extend_from_slice(&len.to_le_bytes());
        code
    };
    Ok(code)
}

/// Unspendable data carrier: OP_FALSE OP_RETURN <push> <payload>
pub fn data_lock_script(payload: &[u8]) -> Result<Vec<u8>, BsvError> {
    let code = pushdata_code(payload.len())?;
    let mut script = Vec::with_capacity(2 + code.len() + payload.len());
    script.push(OP_FALSE);
    script.push(OP_RETURN);
    script.extend_from_slice(&code);
    script.extend_from_slice(payload);
    Ok(script)
}

/// P2PKH scriptSig: <len> <DER sig + sighash byte> <len> <pubkey>
pub fn p2pkh_unlock_script(signature_with_type: &[u8], pubkey: &[u8]) -> Vec<u8> {
    let mut script = Vec::with_capacity(2 + signature_with_type.len() + pubkey.len());
    write_compact_size(&mut script, signature_with_type.len() as u64);
    script.extend_from_slice(signature_with_type);
    write_compact_size(&mut script, pubkey.len() as u64);
    script.extend_from_slice(pubkey);
    script
}

/// Split a P2PKH scriptSig into the signature (with its trailing sighash
/// byte) and the public key.
pub fn parse_p2pkh_unlock_script(script: &[u8]) -> Result<(Vec<u8>, Vec<u8>), BsvError> {
    let (signature, pubkey) = read_two_pushes(script)
        .map_err(|e| BsvError::MalformedScript(format!("not a P2PKH scriptSig: {e}")))?;

    if signature.is_empty() {
        return Err(BsvError::MalformedScript("empty signature push".into()));
    }
    Ok((signature, pubkey))
}

fn read_two_pushes(script: &[u8]) -> Result<(Vec<u8>, Vec<u8>), BsvError> {
    let mut reader = ByteReader::new(script);
    let first = reader.read_var_bytes()?.to_vec();
    let second = reader.read_var_bytes()?.to_vec();
    reader.finish()?;
    Ok((first, second))
}

/// The public-key hash locked by a P2PKH scriptPubKey, if it is one.
pub fn p2pkh_pubkey_hash(script: &[u8]) -> Option<[u8; 20]> {
    match script {
        [OP_DUP, OP_HASH160, PUSH_20, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG] => {
            hash.try_into().ok()
        }
        _ => None,
    }
}
