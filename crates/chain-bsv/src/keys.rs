//! secp256k1 keys, WIF serialization and deterministic ECDSA signing.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use crate::address;
use crate::base58;
use crate::error::BsvError;
use crate::hash::hash160;
use crate::network::BsvNetwork;

/// Suffix marking a WIF key whose public key is used in compressed form.
const COMPRESSED_FLAG: u8 = 0x01;

const SCALAR_LEN: usize = 32;

/// A secp256k1 private scalar in `[1, n-1]`.
///
/// The wrapped k256 key zeroizes its scalar on drop. `Debug` never prints it.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Draw a uniformly random key from the OS CSPRNG.
    ///
    /// Candidates outside `[1, n-1]` are rejected and redrawn rather than
    /// reduced modulo `n`, so no scalar is favoured.
    pub fn generate() -> Self {
        loop {
            let mut candidate = Zeroizing::new([0u8; SCALAR_LEN]);
            crypto_utils::random::fill_random(&mut candidate[..]);
            if let Ok(key) = Self::from_bytes(&candidate) {
                return key;
            }
        }
    }

    /// Build a key from a 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8; SCALAR_LEN]) -> Result<Self, BsvError> {
        let inner = SigningKey::from_bytes(bytes.into())
            .map_err(|e| BsvError::InvalidPrivateKey(format!("invalid secp256k1 scalar: {e}")))?;
        Ok(Self { inner })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, BsvError> {
        let array: &[u8; SCALAR_LEN] = bytes.try_into().map_err(|_| {
            BsvError::InvalidPrivateKey(format!(
                "expected {SCALAR_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Self::from_bytes(array)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, BsvError> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str)
                .map_err(|e| BsvError::InvalidPrivateKey(format!("invalid hex: {e}")))?,
        );
        Self::from_slice(&bytes)
    }

    /// The 32-byte big-endian scalar, wiped when the returned buffer drops.
    pub fn to_bytes(&self) -> Zeroizing<[u8; SCALAR_LEN]> {
        let mut out = Zeroizing::new([0u8; SCALAR_LEN]);
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Public key `d·G`, SEC1-encoded compressed (`0x02`/`0x03` by y parity)
    /// or uncompressed (`0x04`).
    pub fn public_key(&self, compressed: bool) -> PublicKey {
        let point = self.inner.verifying_key().to_encoded_point(compressed);
        PublicKey {
            bytes: point.as_bytes().to_vec(),
        }
    }

    /// Serialize as WIF: `base58check(prefix ++ scalar ++ [0x01 if compressed])`.
    pub fn to_wif(&self, network: BsvNetwork, compressed: bool) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(1 + SCALAR_LEN + 1));
        payload.push(network.wif_prefix());
        payload.extend_from_slice(&self.to_bytes()[..]);
        if compressed {
            payload.push(COMPRESSED_FLAG);
        }
        base58::encode_check(&payload)
    }

    /// Sign a 32-byte message digest, returning a DER-encoded signature.
    ///
    /// The nonce comes from RFC 6979 (HMAC-SHA256 keyed on the scalar and the
    /// digest), so the same key and digest always give the same signature.
    /// `s` is normalized to the lower half of the group order.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Vec<u8>, BsvError> {
        let signature: Signature = self
            .inner
            .sign_prehash(digest)
            .map_err(|e| BsvError::SigningError(format!("ECDSA signing failed: {e}")))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A SEC1-encoded secp256k1 public key (33 bytes compressed, 65 uncompressed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Parse and validate a SEC1 public key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BsvError> {
        if bytes.len() != 33 && bytes.len() != 65 {
            return Err(BsvError::InvalidPublicKeyLength(bytes.len()));
        }
        VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| BsvError::InvalidPublicKey(format!("not a curve point: {e}")))?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_compressed(&self) -> bool {
        self.bytes.len() == 33
    }

    /// RIPEMD160(SHA256(encoded key)).
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.bytes)
    }

    pub fn to_address(&self, network: BsvNetwork) -> String {
        address::encode_p2pkh(&self.hash160(), network)
    }

    /// Verify a DER signature over a 32-byte digest.
    pub fn verify(&self, digest: &[u8; 32], der_signature: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(&self.bytes) else {
            return false;
        };
        let Ok(signature) = Signature::from_der(der_signature) else {
            return false;
        };
        verifying_key.verify_prehash(digest, &signature).is_ok()
    }
}

/// A private key together with the metadata a WIF string carries.
#[derive(Clone, PartialEq, Eq)]
pub struct WifKey {
    pub key: PrivateKey,
    pub network: BsvNetwork,
    /// Whether the public key (and so the address) uses the compressed form.
    pub compressed: bool,
}

impl WifKey {
    pub fn new(key: PrivateKey, network: BsvNetwork, compressed: bool) -> Self {
        Self {
            key,
            network,
            compressed,
        }
    }

    /// Fresh random key using compressed public keys.
    pub fn generate(network: BsvNetwork) -> Self {
        Self::new(PrivateKey::generate(), network, true)
    }

    /// Parse a WIF string.
    ///
    /// The payload must be 33 bytes (uncompressed) or 34 bytes ending in
    /// `0x01` (compressed). The prefix selects the network.
    pub fn from_wif(wif: &str) -> Result<Self, BsvError> {
        let payload = Zeroizing::new(base58::decode_check(wif)?);

        let prefix = *payload
            .first()
            .ok_or_else(|| BsvError::InvalidWif("empty payload".into()))?;
        let network =
            BsvNetwork::from_wif_prefix(prefix).ok_or(BsvError::UnsupportedNetwork { prefix })?;

        let compressed = match payload.len() {
            34 if payload[33] == COMPRESSED_FLAG => true,
            34 => {
                return Err(BsvError::InvalidWif(format!(
                    "invalid compression flag 0x{:02x}",
                    payload[33]
                )))
            }
            33 => false,
            len => {
                return Err(BsvError::InvalidWif(format!(
                    "invalid payload length {len}, expected 33 or 34"
                )))
            }
        };

        let key = PrivateKey::from_slice(&payload[1..1 + SCALAR_LEN])?;
        Ok(Self::new(key, network, compressed))
    }

    pub fn to_wif(&self) -> String {
        self.key.to_wif(self.network, self.compressed)
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key(self.compressed)
    }

    pub fn address(&self) -> String {
        self.public_key().to_address(self.network)
    }
}

impl std::fmt::Debug for WifKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifKey")
            .field("address", &self.address())
            .field("network", &self.network)
            .field("compressed", &self.compressed)
            .finish()
    }
}
