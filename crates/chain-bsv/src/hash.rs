//! Hash primitives: SHA-256, double SHA-256, HASH160 and the Base58Check
//! checksum.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice, as used for txids, checksums and sighash components.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// RIPEMD-160(SHA-256(data)), the public-key hash committed to by P2PKH.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    Ripemd160::digest(sha).into()
}

/// First four bytes of the double SHA-256, the Base58Check checksum.
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let digest = double_sha256(data);
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}
