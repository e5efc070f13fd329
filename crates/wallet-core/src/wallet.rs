//! The wallet service: keys, deposits, payments and the cooperative
//! payment flow on top of a repository and the chain services.
//!
//! Every operation that broadcasts only touches the repository after the
//! network has accepted the transaction.

use std::collections::HashMap;

use chain_bsv::builder::{self, BuiltTransaction, Destination, Spend};
use chain_bsv::{address, cooperative, PartialTransaction, WifKey};
use crypto_utils::kdf;
use secrecy::SecretString;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::repository::WalletRepository;
use crate::services::ChainServices;
use crate::types::{Direction, HistoryEntry, KeyRecord, UtxoRecord};
use crate::vault::KeyVault;

pub struct Wallet<R, S> {
    config: WalletConfig,
    repo: R,
    services: S,
    vault: KeyVault,
}

impl<R: WalletRepository, S: ChainServices> Wallet<R, S> {
    /// Open the wallet stored in `repo`, or initialise it if `repo` is empty.
    ///
    /// A fresh repository gets a vault salt and a first receive key. For an
    /// existing one the password is checked against the first stored key.
    pub fn open(
        config: WalletConfig,
        mut repo: R,
        services: S,
        password: &SecretString,
    ) -> Result<Self, WalletError> {
        config.validate()?;

        let salt = match repo.vault_salt()? {
            Some(salt) => salt,
            None => {
                let salt = kdf::generate_salt();
                repo.set_vault_salt(salt)?;
                salt
            }
        };
        let vault = KeyVault::unlock(password, &salt, &config.kdf)?;

        let mut wallet = Self {
            config,
            repo,
            services,
            vault,
        };

        match wallet.repo.keys()?.first() {
            Some(record) => {
                wallet.vault.open(&record.address, &record.sealed_wif)?;
            }
            None => {
                wallet.new_receive_address()?;
            }
        }

        tracing::info!(network = %wallet.config.network, "wallet opened");
        Ok(wallet)
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    pub fn receive_address(&self) -> Result<String, WalletError> {
        self.repo
            .active_key()?
            .map(|record| record.address)
            .ok_or_else(|| WalletError::Internal("no active receive key".into()))
    }

    /// Generate a fresh key and make it the receive address.
    pub fn new_receive_address(&mut self) -> Result<String, WalletError> {
        let key = WifKey::generate(self.config.network);
        let address = self.store_key(&key)?;
        self.repo.set_active(&address)?;
        tracing::info!(address = %address, "new receive address");
        Ok(address)
    }

    /// Import an existing key. It becomes the receive address only if the
    /// wallet has none.
    pub fn import_wif(&mut self, wif: &str) -> Result<String, WalletError> {
        let key = WifKey::from_wif(wif)?;
        if key.network != self.config.network {
            return Err(WalletError::NetworkMismatch {
                expected: self.config.network,
                actual: key.network,
            });
        }

        let address = self.store_key(&key)?;
        if self.repo.active_key()?.is_none() {
            self.repo.set_active(&address)?;
        }
        tracing::info!(address = %address, "imported key");
        Ok(address)
    }

    /// All controlled addresses, newest first.
    pub fn addresses(&self) -> Result<Vec<String>, WalletError> {
        Ok(self
            .repo
            .keys()?
            .into_iter()
            .rev()
            .map(|record| record.address)
            .collect())
    }

    /// Pick a payable address for this wallet's network out of scanned text.
    pub fn detect_address(&self, text: &str) -> Option<String> {
        address::find_address(text, self.config.network)
    }

    /// Record any unspent outputs the indexer reports for `address`.
    /// Returns only the outputs that were not already known.
    pub fn confirm_deposit(&mut self, address: &str) -> Result<Vec<UtxoRecord>, WalletError> {
        if self.repo.key(address)?.is_none() {
            return Err(WalletError::UnknownAddress(address.to_string()));
        }

        let mut fresh = Vec::new();
        for remote in self.services.list_unspent(address)? {
            let record = UtxoRecord::new(remote.into(), address);
            if self.repo.insert_utxo(record.clone())? {
                self.repo.record_history(HistoryEntry {
                    txid: record.txid.clone(),
                    amount: record.amount,
                    raw_tx: None,
                    direction: Direction::Received,
                })?;
                fresh.push(record);
            }
        }

        tracing::info!(address = %address, new_outputs = fresh.len(), "deposit confirmed");
        Ok(fresh)
    }

    /// Rebuild the UTXO set from the indexer for every controlled address.
    ///
    /// All lookups finish before the stored set is replaced, so a failed
    /// lookup leaves the previous state intact.
    pub fn resync(&mut self) -> Result<u64, WalletError> {
        let mut records = Vec::new();
        for key in self.repo.keys()? {
            for remote in self.services.list_unspent(&key.address)? {
                records.push(UtxoRecord::new(remote.into(), key.address.clone()));
            }
        }

        self.repo.clear_utxos()?;
        for record in records {
            self.repo.insert_utxo(record)?;
        }

        let balance = self.balance()?;
        tracing::info!(balance, "resynced");
        Ok(balance)
    }

    pub fn balance(&self) -> Result<u64, WalletError> {
        self.repo
            .utxos()?
            .iter()
            .try_fold(0u64, |acc, utxo| acc.checked_add(utxo.amount))
            .ok_or_else(|| WalletError::Internal("balance overflows u64".into()))
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, WalletError> {
        self.repo.history()
    }

    /// Pay `amount` satoshis to `address`, returning change to the receive
    /// address.
    pub fn pay(&mut self, address: &str, amount: u64) -> Result<BuiltTransaction, WalletError> {
        self.pay_to(&[Destination::payment(address, amount)])
    }

    /// Spend every known output into `destinations`.
    pub fn pay_to(&mut self, destinations: &[Destination]) -> Result<BuiltTransaction, WalletError> {
        for destination in destinations {
            if let Destination::Payment { address, .. } = destination {
                self.check_network(address)?;
            }
        }

        let utxos = self.spendable()?;
        let change_address = self.receive_address()?;
        let built = {
            let keys = self.unlock_keys(&utxos)?;
            let spends = spends(&utxos, &keys)?;
            builder::create_transaction(
                &spends,
                destinations,
                &change_address,
                &self.config.fee_policy,
            )?
        };

        self.broadcast(&built)?;
        self.settle_spent(&utxos, &built)?;
        if let Some(change) = &built.created_utxo {
            self.repo.insert_utxo(UtxoRecord::new(change.clone(), change_address))?;
        }
        Ok(built)
    }

    /// Send everything to `address`.
    pub fn sweep(&mut self, address: &str) -> Result<BuiltTransaction, WalletError> {
        self.check_network(address)?;

        let utxos = self.spendable()?;
        let built = {
            let keys = self.unlock_keys(&utxos)?;
            let spends = spends(&utxos, &keys)?;
            builder::sweep(&spends, address, &self.config.fee_policy)?
        };

        self.broadcast(&built)?;
        self.settle_spent(&utxos, &built)?;
        Ok(built)
    }

    /// Payer side of the cooperative payment: sign over every known output
    /// so that whoever scans the result can take `amount` satoshis, fee
    /// included. Change goes back to the receive address.
    ///
    /// Nothing is stored; the spent outputs disappear on the next
    /// [`resync`](Self::resync) once the payee broadcasts.
    pub fn authorize_payment(&self, amount: u64) -> Result<PartialTransaction, WalletError> {
        let utxos = self.spendable()?;
        let change_address = self.receive_address()?;
        let keys = self.unlock_keys(&utxos)?;
        let spends = spends(&utxos, &keys)?;

        let partial = cooperative::generate_sighash_single_rawtx(&spends, &change_address, amount)?;
        tracing::info!(amount, inputs = utxos.len(), "payment authorized");
        Ok(partial)
    }

    /// Payee side: complete a scanned partial transaction, paying ourselves
    /// at the receive address, and broadcast it.
    ///
    /// Input values are looked up independently rather than trusted from
    /// the payer.
    pub fn accept_payment(
        &mut self,
        partial: &PartialTransaction,
    ) -> Result<BuiltTransaction, WalletError> {
        let input_amounts = partial
            .outpoints()?
            .into_iter()
            .map(|(txid, index)| {
                self.services
                    .get_transaction(&txid)?
                    .output_value(&txid, index)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pay_to = self.receive_address()?;
        let built = cooperative::get_rawtx_to_pay(
            partial,
            &input_amounts,
            &pay_to,
            &self.config.fee_policy,
        )?;

        self.broadcast(&built)?;
        if let Some(created) = &built.created_utxo {
            self.repo.insert_utxo(UtxoRecord::new(created.clone(), pay_to))?;
        }
        self.repo.record_history(HistoryEntry {
            txid: built.txid.clone(),
            amount: built.amount,
            raw_tx: Some(built.raw_tx.clone()),
            direction: Direction::Received,
        })?;
        Ok(built)
    }

    /// [`accept_payment`](Self::accept_payment) for the JSON payload carried
    /// by the payer's QR code.
    pub fn accept_payment_json(&mut self, json: &str) -> Result<BuiltTransaction, WalletError> {
        let partial: PartialTransaction = serde_json::from_str(json)?;
        self.accept_payment(&partial)
    }

    fn store_key(&mut self, key: &WifKey) -> Result<String, WalletError> {
        let address = key.address();
        let sealed_wif = self.vault.seal(key)?;
        self.repo.insert_key(KeyRecord {
            address: address.clone(),
            sealed_wif,
            active: false,
        })?;
        Ok(address)
    }

    fn check_network(&self, address: &str) -> Result<(), WalletError> {
        let network = address::address_network(address)?;
        if network != self.config.network {
            return Err(WalletError::NetworkMismatch {
                expected: self.config.network,
                actual: network,
            });
        }
        Ok(())
    }

    fn spendable(&self) -> Result<Vec<UtxoRecord>, WalletError> {
        let utxos = self.repo.utxos()?;
        if utxos.is_empty() {
            return Err(WalletError::NoSpendableOutputs);
        }
        Ok(utxos)
    }

    /// Open the key for every address owning one of `utxos`. Each key is
    /// opened once and dropped (zeroized) with the returned map.
    fn unlock_keys(&self, utxos: &[UtxoRecord]) -> Result<HashMap<String, WifKey>, WalletError> {
        let mut keys = HashMap::new();
        for utxo in utxos {
            if keys.contains_key(&utxo.address) {
                continue;
            }
            let record = self
                .repo
                .key(&utxo.address)?
                .ok_or_else(|| WalletError::UnknownAddress(utxo.address.clone()))?;
            let key = self.vault.open(&record.address, &record.sealed_wif)?;
            keys.insert(record.address, key);
        }
        Ok(keys)
    }

    fn broadcast(&self, built: &BuiltTransaction) -> Result<(), WalletError> {
        let response = self.services.broadcast(&built.raw_tx)?;
        if !response.is_accepted() {
            let reason = response
                .error_message
                .unwrap_or_else(|| "no reason given".into());
            tracing::warn!(txid = %built.txid, reason = %reason, "broadcast rejected");
            return Err(WalletError::BroadcastRejected(reason));
        }
        if response.is_duplicate() {
            tracing::warn!(txid = %built.txid, "transaction already known to the network");
        }
        tracing::info!(txid = %built.txid, fee = built.fee, amount = built.amount, "broadcast");
        Ok(())
    }

    /// Drop the outputs a broadcast transaction consumed and record it as sent.
    fn settle_spent(
        &mut self,
        spent: &[UtxoRecord],
        built: &BuiltTransaction,
    ) -> Result<(), WalletError> {
        for utxo in spent {
            self.repo.remove_utxo(&utxo.txid, utxo.output_index)?;
        }
        self.repo.record_history(HistoryEntry {
            txid: built.txid.clone(),
            amount: built.amount,
            raw_tx: Some(built.raw_tx.clone()),
            direction: Direction::Sent,
        })?;
        Ok(())
    }
}

impl<R, S> std::fmt::Debug for Wallet<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("network", &self.config.network)
            .finish_non_exhaustive()
    }
}

fn spends<'k>(
    utxos: &[UtxoRecord],
    keys: &'k HashMap<String, WifKey>,
) -> Result<Vec<Spend<'k>>, WalletError> {
    utxos
        .iter()
        .map(|utxo| {
            let key = keys
                .get(&utxo.address)
                .ok_or_else(|| WalletError::UnknownAddress(utxo.address.clone()))?;
            Ok(Spend::new(utxo.to_unspent(), key))
        })
        .collect()
}
