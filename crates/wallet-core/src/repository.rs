//! Storage interface for wallet state.
//!
//! The wallet owns a repository instead of reaching for a global session;
//! any persistent backend implements [`WalletRepository`].

use crate::error::WalletError;
use crate::types::{HistoryEntry, KeyRecord, UtxoRecord};

pub trait WalletRepository {
    /// All keys, oldest first.
    fn keys(&self) -> Result<Vec<KeyRecord>, WalletError>;

    fn key(&self, address: &str) -> Result<Option<KeyRecord>, WalletError>;

    /// Insert a key. Fails if the address is already stored.
    fn insert_key(&mut self, record: KeyRecord) -> Result<(), WalletError>;

    /// Mark `address` as the receive address; every other key is
    /// deactivated.
    fn set_active(&mut self, address: &str) -> Result<(), WalletError>;

    fn active_key(&self) -> Result<Option<KeyRecord>, WalletError>;

    fn utxos(&self) -> Result<Vec<UtxoRecord>, WalletError>;

    /// Returns `false` when an output with the same `(txid, output_index)`
    /// is already stored.
    fn insert_utxo(&mut self, utxo: UtxoRecord) -> Result<bool, WalletError>;

    fn remove_utxo(&mut self, txid: &str, output_index: u32) -> Result<(), WalletError>;

    fn clear_utxos(&mut self) -> Result<(), WalletError>;

    fn history(&self) -> Result<Vec<HistoryEntry>, WalletError>;

    /// Returns `false` when the txid is already recorded.
    fn record_history(&mut self, entry: HistoryEntry) -> Result<bool, WalletError>;

    fn vault_salt(&self) -> Result<Option<[u8; 16]>, WalletError>;

    fn set_vault_salt(&mut self, salt: [u8; 16]) -> Result<(), WalletError>;
}

/// In-process repository. Holds only sealed key material.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    keys: Vec<KeyRecord>,
    utxos: Vec<UtxoRecord>,
    history: Vec<HistoryEntry>,
    vault_salt: Option<[u8; 16]>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletRepository for MemoryRepository {
    fn keys(&self) -> Result<Vec<KeyRecord>, WalletError> {
        Ok(self.keys.clone())
    }

    fn key(&self, address: &str) -> Result<Option<KeyRecord>, WalletError> {
        Ok(self.keys.iter().find(|k| k.address == address).cloned())
    }

    fn insert_key(&mut self, record: KeyRecord) -> Result<(), WalletError> {
        if self.keys.iter().any(|k| k.address == record.address) {
            return Err(WalletError::Storage(format!(
                "key for {} already stored",
                record.address
            )));
        }
        self.keys.push(record);
        Ok(())
    }

    fn set_active(&mut self, address: &str) -> Result<(), WalletError> {
        if !self.keys.iter().any(|k| k.address == address) {
            return Err(WalletError::UnknownAddress(address.to_string()));
        }
        for key in &mut self.keys {
            key.active = key.address == address;
        }
        Ok(())
    }

    fn active_key(&self) -> Result<Option<KeyRecord>, WalletError> {
        Ok(self.keys.iter().find(|k| k.active).cloned())
    }

    fn utxos(&self) -> Result<Vec<UtxoRecord>, WalletError> {
        Ok(self.utxos.clone())
    }

    fn insert_utxo(&mut self, utxo: UtxoRecord) -> Result<bool, WalletError> {
        if self.utxos.iter().any(|u| u.outpoint() == utxo.outpoint()) {
            return Ok(false);
        }
        self.utxos.push(utxo);
        Ok(true)
    }

    fn remove_utxo(&mut self, txid: &str, output_index: u32) -> Result<(), WalletError> {
        self.utxos.retain(|u| u.outpoint() != (txid, output_index));
        Ok(())
    }

    fn clear_utxos(&mut self) -> Result<(), WalletError> {
        self.utxos.clear();
        Ok(())
    }

    fn history(&self) -> Result<Vec<HistoryEntry>, WalletError> {
        Ok(self.history.clone())
    }

    fn record_history(&mut self, entry: HistoryEntry) -> Result<bool, WalletError> {
        if self.history.iter().any(|h| h.txid == entry.txid) {
            return Ok(false);
        }
        self.history.push(entry);
        Ok(true)
    }

    fn vault_salt(&self) -> Result<Option<[u8; 16]>, WalletError> {
        Ok(self.vault_salt)
    }

    fn set_vault_salt(&mut self, salt: [u8; 16]) -> Result<(), WalletError> {
        self.vault_salt = Some(salt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn key(address: &str) -> KeyRecord {
        KeyRecord {
            address: address.into(),
            sealed_wif: vec![1, 2, 3],
            active: false,
        }
    }

    fn utxo(txid: &str, output_index: u32) -> UtxoRecord {
        UtxoRecord {
            txid: txid.into(),
            output_index,
            amount: 1_000,
            address: "a".into(),
        }
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut repo = MemoryRepository::new();
        repo.insert_key(key("a")).unwrap();
        assert!(matches!(
            repo.insert_key(key("a")),
            Err(WalletError::Storage(_))
        ));
        assert_eq!(repo.keys().unwrap().len(), 1);
    }

    #[test]
    fn only_one_active_key() {
        let mut repo = MemoryRepository::new();
        repo.insert_key(key("a")).unwrap();
        repo.insert_key(key("b")).unwrap();

        repo.set_active("a").unwrap();
        repo.set_active("b").unwrap();

        assert_eq!(repo.active_key().unwrap().unwrap().address, "b");
        assert_eq!(repo.keys().unwrap().iter().filter(|k| k.active).count(), 1);
        assert!(matches!(
            repo.set_active("zzz"),
            Err(WalletError::UnknownAddress(_))
        ));
    }

    #[test]
    fn utxos_unique_by_outpoint() {
        let mut repo = MemoryRepository::new();
        assert!(repo.insert_utxo(utxo("t1", 0)).unwrap());
        assert!(!repo.insert_utxo(utxo("t1", 0)).unwrap());
        assert!(repo.insert_utxo(utxo("t1", 1)).unwrap());
        assert_eq!(repo.utxos().unwrap().len(), 2);

        repo.remove_utxo("t1", 0).unwrap();
        assert_eq!(repo.utxos().unwrap(), vec![utxo("t1", 1)]);

        repo.clear_utxos().unwrap();
        assert!(repo.utxos().unwrap().is_empty());
    }

    #[test]
    fn history_unique_by_txid() {
        let mut repo = MemoryRepository::new();
        let entry = HistoryEntry {
            txid: "t1".into(),
            amount: 5,
            raw_tx: None,
            direction: Direction::Sent,
        };
        assert!(repo.record_history(entry.clone()).unwrap());
        assert!(!repo.record_history(entry).unwrap());
        assert_eq!(repo.history().unwrap().len(), 1);
    }
}
