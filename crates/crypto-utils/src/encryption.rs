use aes_gcm::aead::{Aead, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};

use crate::error::CryptoError;

/// AES-256-GCM nonce size in bytes.
const NONCE_SIZE: usize = 12;

/// Seals `plaintext` under `key` with AES-256-GCM, authenticating `aad`.
///
/// The associated data is not stored; the same bytes must be presented to
/// [`open`]. The wallet passes the owning address so a sealed key cannot be
/// moved onto another record. Layout: `[nonce (12 bytes) | ciphertext + tag]`.
pub fn seal(plaintext: &[u8], key: &[u8; 32], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|e| CryptoError::SealFailed(e.to_string()))?;

    let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);

    Ok(output)
}

/// Opens data previously produced by [`seal`] with the same key and `aad`.
pub fn open(sealed: &[u8], key: &[u8; 32], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < NONCE_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "sealed data too short: expected at least {} bytes, got {}",
            NONCE_SIZE,
            sealed.len()
        )));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad })
        .map_err(|e| CryptoError::UnsealFailed(e.to_string()))
}
