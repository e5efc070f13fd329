//! Network selection and the version bytes each network prefixes onto keys
//! and addresses.

use serde::{Deserialize, Serialize};

/// Supported Bitcoin SV networks. Serialized as `"main"`/`"test"`, the same
/// names `Display` prints; `"mainnet"`/`"testnet"` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BsvNetwork {
    #[default]
    #[serde(rename = "main", alias = "mainnet")]
    Mainnet,
    #[serde(rename = "test", alias = "testnet")]
    Testnet,
}

impl BsvNetwork {
    /// Version byte prepended to a WIF private key.
    pub fn wif_prefix(self) -> u8 {
        match self {
            BsvNetwork::Mainnet => 0x80,
            BsvNetwork::Testnet => 0xef,
        }
    }

    /// Version byte of a P2PKH address.
    pub fn pubkey_hash_prefix(self) -> u8 {
        match self {
            BsvNetwork::Mainnet => 0x00,
            BsvNetwork::Testnet => 0x6f,
        }
    }

    /// Version byte of a P2SH address. Only used to give a precise error
    /// when such an address is offered as a payment destination.
    pub fn script_hash_prefix(self) -> u8 {
        match self {
            BsvNetwork::Mainnet => 0x05,
            BsvNetwork::Testnet => 0xc4,
        }
    }

    pub fn from_wif_prefix(prefix: u8) -> Option<Self> {
        [BsvNetwork::Mainnet, BsvNetwork::Testnet]
            .into_iter()
            .find(|n| n.wif_prefix() == prefix)
    }

    pub fn from_pubkey_hash_prefix(prefix: u8) -> Option<Self> {
        [BsvNetwork::Mainnet, BsvNetwork::Testnet]
            .into_iter()
            .find(|n| n.pubkey_hash_prefix() == prefix)
    }
}

impl std::fmt::Display for BsvNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BsvNetwork::Mainnet => write!(f, "main"),
            BsvNetwork::Testnet => write!(f, "test"),
        }
    }
}
