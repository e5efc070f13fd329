//! Password-derived encryption of private keys at rest.

use chain_bsv::WifKey;
use crypto_utils::{encryption, kdf, KdfParams};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Seals private keys at rest with a password-derived AES-256-GCM key.
///
/// Each WIF is sealed with its address as associated data, so a ciphertext
/// copied onto another key record fails to open. Plaintext WIFs only ever
/// live in zeroizing buffers.
pub struct KeyVault {
    key: Zeroizing<[u8; 32]>,
}

impl KeyVault {
    /// Derive the vault key from `password` and `salt` with Argon2id.
    pub fn unlock(
        password: &SecretString,
        salt: &[u8; 16],
        params: &KdfParams,
    ) -> Result<Self, WalletError> {
        let key = kdf::derive_key(password.expose_secret().as_bytes(), salt, params)?;
        Ok(Self {
            key: Zeroizing::new(key),
        })
    }

    pub fn seal(&self, key: &WifKey) -> Result<Vec<u8>, WalletError> {
        let wif = Zeroizing::new(key.to_wif());
        let sealed = encryption::seal(wif.as_bytes(), &self.key, key.address().as_bytes())?;
        Ok(sealed)
    }

    /// Open the WIF sealed for `address` and check that it really controls
    /// that address.
    pub fn open(&self, address: &str, sealed: &[u8]) -> Result<WifKey, WalletError> {
        let plaintext = Zeroizing::new(
            encryption::open(sealed, &self.key, address.as_bytes())
                .map_err(|e| WalletError::DecryptionFailed(e.to_string()))?,
        );
        let wif = std::str::from_utf8(&plaintext)
            .map_err(|_| WalletError::DecryptionFailed("sealed key is not UTF-8".into()))?;
        let key = WifKey::from_wif(wif)?;

        if key.address() != address {
            return Err(WalletError::DecryptionFailed(format!(
                "sealed key does not control {address}"
            )));
        }
        Ok(key)
    }
}

impl std::fmt::Debug for KeyVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyVault(<locked key>)")
    }
}
