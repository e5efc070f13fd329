//! P2PKH address derivation and decoding.
//!
//! Format: `base58check(version_byte ++ hash160(pubkey))`.

use crate::base58;
use crate::error::BsvError;
use crate::hash::hash160;
use crate::network::BsvNetwork;

const PAYLOAD_LEN: usize = 21;

/// Shortest and longest Base58 rendering of a 21-byte payload.
const MIN_ADDRESS_CHARS: usize = 26;
const MAX_ADDRESS_CHARS: usize = 35;

/// Derive the P2PKH address for a SEC1-encoded public key.
///
/// The key is hashed as given, so a compressed and an uncompressed
/// encoding of the same point produce different addresses.
pub fn derive_address(pubkey: &[u8], network: BsvNetwork) -> Result<String, BsvError> {
    if pubkey.len() != 33 && pubkey.len() != 65 {
        return Err(BsvError::InvalidPublicKeyLength(pubkey.len()));
    }
    Ok(encode_p2pkh(&hash160(pubkey), network))
}

/// Base58Check-encode a public-key hash with the network's version byte.
pub fn encode_p2pkh(pubkey_hash: &[u8; 20], network: BsvNetwork) -> String {
    let mut payload = Vec::with_capacity(PAYLOAD_LEN);
    payload.push(network.pubkey_hash_prefix());
    payload.extend_from_slice(pubkey_hash);
    base58::encode_check(&payload)
}

/// Decode an address into its network and 20-byte public-key hash.
pub fn decode_p2pkh(address: &str) -> Result<(BsvNetwork, [u8; 20]), BsvError> {
    let payload = base58::decode_check(address)?;
    if payload.len() != PAYLOAD_LEN {
        return Err(BsvError::InvalidAddress(format!(
            "expected {PAYLOAD_LEN} byte payload, got {}",
            payload.len()
        )));
    }

    let prefix = payload[0];
    let network = match BsvNetwork::from_pubkey_hash_prefix(prefix) {
        Some(network) => network,
        None if is_script_hash_prefix(prefix) => {
            return Err(BsvError::InvalidAddress(format!(
                "{address} is a pay-to-script-hash address"
            )))
        }
        None => return Err(BsvError::UnrecognizedAddressNetwork { prefix }),
    };

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok((network, hash))
}

/// The 20-byte public-key hash an address commits to.
pub fn address_to_pubkey_hash(address: &str) -> Result<[u8; 20], BsvError> {
    decode_p2pkh(address).map(|(_, hash)| hash)
}

pub fn address_network(address: &str) -> Result<BsvNetwork, BsvError> {
    decode_p2pkh(address).map(|(network, _)| network)
}

/// Find the first valid P2PKH address for `network` inside scanned text,
/// such as a `bitcoin:` URI or a pasted sentence.
pub fn find_address(text: &str, network: BsvNetwork) -> Option<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| (MIN_ADDRESS_CHARS..=MAX_ADDRESS_CHARS).contains(&word.len()))
        .find(|word| matches!(address_network(word), Ok(n) if n == network))
        .map(str::to_owned)
}

fn is_script_hash_prefix(prefix: u8) -> bool {
    [BsvNetwork::Mainnet, BsvNetwork::Testnet]
        .into_iter()
        .any(|n| n.script_hash_prefix() == prefix)
}
