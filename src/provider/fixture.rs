//! FixtureProvider - answers from a recorded wallet document. No keys, no network.
//!
//! Useful for DApp development against a known wallet state and for exercising the
//! bridge end to end. Writes (`add_redeem_script`) only touch the in-memory copy.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::WalletProvider;
use crate::entities::{ChangeType, TransactionOutput, Utxo};
use crate::network::MAINNET_MAGIC;

/// Per-DApp slice of the wallet. The unnamed slice (`wallet`) serves calls without a DApp id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DAppFixture {
    pub receive_index: u32,
    pub change_index: u32,
    pub redeem_scripts: Vec<String>,
    pub spendable_utxos: Vec<Utxo>,
    pub unspendable_utxos: Vec<Utxo>,
}

impl DAppFixture {
    fn index(&self, change: ChangeType) -> u32 {
        match change { ChangeType::Receive => self.receive_index, ChangeType::Change => self.change_index }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletFixture {
    pub receive_addresses: Vec<String>,
    pub change_addresses: Vec<String>,
    pub wallet: DAppFixture,
    pub dapps: HashMap<String, DAppFixture>,
    /// Address -> DER signature (hex) returned by `sign`.
    pub signatures: HashMap<String, String>,
    pub signed_tx: Option<String>,
    pub protocol_version: i64,
    pub network_magic: u32,
    pub fee_per_byte: u64,
}

impl Default for WalletFixture {
    fn default() -> Self {
        Self {
            receive_addresses: Vec::new(),
            change_addresses: Vec::new(),
            wallet: DAppFixture::default(),
            dapps: HashMap::new(),
            signatures: HashMap::new(),
            signed_tx: None,
            protocol_version: 70015,
            network_magic: MAINNET_MAGIC,
            fee_per_byte: 1,
        }
    }
}

impl WalletFixture {
    fn slice(&self, dapp_id: Option<&str>) -> Option<&DAppFixture> {
        match dapp_id {
            Some(id) => self.dapps.get(id),
            None => Some(&self.wallet),
        }
    }

    fn addresses(&self, change: ChangeType) -> &[String] {
        match change { ChangeType::Receive => &self.receive_addresses, ChangeType::Change => &self.change_addresses }
    }
}

pub struct FixtureProvider {
    fixture: RwLock<WalletFixture>,
}

impl FixtureProvider {
    pub fn new(fixture: WalletFixture) -> Self { Self { fixture: RwLock::new(fixture) } }

    pub fn from_json(json: &str) -> Result<Self> { Ok(Self::new(serde_json::from_str(json)?)) }

    #[cfg(feature = "native")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await
            .map_err(|e| anyhow!("fixture {}: {}", path.display(), e))?;
        let provider = Self::from_json(&raw)?;
        tracing::debug!(path = %path.display(), "Loaded wallet fixture");
        Ok(provider)
    }

    /// Copy of the current fixture, including writes made through the provider.
    pub fn snapshot(&self) -> Result<WalletFixture> { Ok(self.read()?.clone()) }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, WalletFixture>> {
        self.fixture.read().map_err(|_| anyhow!("fixture lock poisoned"))
    }
}

#[async_trait]
impl WalletProvider for FixtureProvider {
    async fn get_addresses(&self, change: ChangeType, size: u32, start_index: Option<u32>, dapp_id: Option<&str>) -> Result<Value> {
        let f = self.read()?;
        let start = match start_index {
            Some(i) => i,
            None => f.slice(dapp_id).map(|s| s.index(change)).unwrap_or(0),
        } as usize;
        let end = start + size as usize;
        let addresses = f.addresses(change).get(start..end)
            .ok_or_else(|| anyhow!("{} addresses {}..{} not in fixture", change.as_str(), start, end))?;
        Ok(serde_json::to_value(addresses)?)
    }

    async fn get_address_index(&self, change: ChangeType, dapp_id: Option<&str>) -> Result<Value> {
        let f = self.read()?;
        Ok(Value::from(f.slice(dapp_id).map(|s| s.index(change)).unwrap_or(0)))
    }

    async fn get_redeem_scripts(&self, dapp_id: Option<&str>) -> Result<Value> {
        let f = self.read()?;
        let scripts = f.slice(dapp_id).map(|s| s.redeem_scripts.clone()).unwrap_or_default();
        Ok(serde_json::to_value(scripts)?)
    }

    async fn add_redeem_script(&self, redeem_script: &str, dapp_id: Option<&str>) -> Result<Option<Value>> {
        let mut f = self.fixture.write().map_err(|_| anyhow!("fixture lock poisoned"))?;
        let slice = match dapp_id {
            Some(id) => f.dapps.entry(id.to_string()).or_default(),
            None => &mut f.wallet,
        };
        if !slice.redeem_scripts.iter().any(|s| s == redeem_script) {
            slice.redeem_scripts.push(redeem_script.to_string());
        }
        Ok(None)
    }

    async fn get_spendable_utxos(&self, dapp_id: Option<&str>) -> Result<Value> {
        let f = self.read()?;
        let utxos = f.slice(dapp_id).map(|s| s.spendable_utxos.clone()).unwrap_or_default();
        Ok(serde_json::to_value(utxos)?)
    }

    async fn get_unspendable_utxos(&self, dapp_id: &str) -> Result<Value> {
        let f = self.read()?;
        let utxos = f.dapps.get(dapp_id).map(|s| s.unspendable_utxos.clone()).unwrap_or_default();
        Ok(serde_json::to_value(utxos)?)
    }

    async fn sign(&self, address: &str, _data_hex: &str) -> Result<Value> {
        let f = self.read()?;
        let signature = f.signatures.get(address).ok_or_else(|| anyhow!("no key for {}", address))?;
        Ok(Value::String(signature.clone()))
    }

    async fn create_signed_tx(&self, outputs: &[TransactionOutput], dapp_id: Option<&str>) -> Result<Value> {
        let f = self.read()?;
        // Saturates: a wallet past u64::MAX covers any representable request
        let available = f.slice(dapp_id)
            .map(|s| s.spendable_utxos.iter().fold(0u64, |acc, u| acc.saturating_add(u.satoshis)))
            .unwrap_or(0);
        let requested = outputs.iter().try_fold(0u64, |acc, o| acc.checked_add(o.amount))
            .ok_or_else(|| anyhow!("output amounts overflow"))?;
        if requested > available {
            return Err(anyhow!("insufficient funds: requested {}, available {}", requested, available));
        }
        let tx = f.signed_tx.as_ref().ok_or_else(|| anyhow!("fixture has no signed transaction"))?;
        Ok(Value::String(tx.clone()))
    }

    async fn get_protocol_version(&self) -> Result<Value> { Ok(Value::from(self.read()?.protocol_version)) }

    async fn get_network_magic(&self) -> Result<Value> { Ok(Value::from(self.read()?.network_magic)) }

    async fn get_fee_per_byte(&self) -> Result<Value> { Ok(Value::from(self.read()?.fee_per_byte)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DAPP: &str = "53212266f7994100e442f6dff10fbdb50a93121d25c196ce0597517d35d42e68";

    fn provider() -> FixtureProvider {
        FixtureProvider::from_json(&json!({
            "receiveAddresses": ["bitcoincash:a0", "bitcoincash:a1", "bitcoincash:a2"],
            "wallet": { "receiveIndex": 1 },
            "dapps": { DAPP: { "redeemScripts": ["51519587"] } }
        }).to_string()).unwrap()
    }

    #[tokio::test]
    async fn addresses_start_at_current_index_by_default() {
        let p = provider();
        assert_eq!(p.get_addresses(ChangeType::Receive, 2, None, None).await.unwrap(), json!(["bitcoincash:a1", "bitcoincash:a2"]));
        assert_eq!(p.get_addresses(ChangeType::Receive, 1, Some(0), None).await.unwrap(), json!(["bitcoincash:a0"]));
        assert!(p.get_addresses(ChangeType::Receive, 5, None, None).await.is_err());
        assert!(p.get_addresses(ChangeType::Change, 1, None, None).await.is_err());
    }

    #[tokio::test]
    async fn add_redeem_script_acknowledges_with_nothing() {
        let p = provider();
        assert_eq!(p.add_redeem_script("5187", Some(DAPP)).await.unwrap(), None);
        assert_eq!(p.add_redeem_script("5187", Some(DAPP)).await.unwrap(), None);
        assert_eq!(p.get_redeem_scripts(Some(DAPP)).await.unwrap(), json!(["51519587", "5187"]));
        assert_eq!(p.get_redeem_scripts(None).await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn defaults_describe_a_mainnet_wallet() {
        let p = FixtureProvider::new(WalletFixture::default());
        assert_eq!(p.get_network_magic().await.unwrap(), json!(0xE3E1F3E8u32));
        assert_eq!(p.get_fee_per_byte().await.unwrap(), json!(1));
        assert_eq!(p.get_protocol_version().await.unwrap(), json!(70015));
        assert!(p.create_signed_tx(&[TransactionOutput::new("51", 1)], None).await.is_err());
    }

    #[tokio::test]
    async fn huge_utxo_values_do_not_overflow_available_funds() {
        let utxo = |satoshis: u64| json!({
            "txid": "10a879077602483f7e89cae7202c95119fc9ce53db55f33c7efe401703aa7c38",
            "outputIndex": 0,
            "address": "bitcoincash:a0",
            "script": "51",
            "satoshis": satoshis
        });
        let p = FixtureProvider::from_json(&json!({
            "wallet": { "spendableUtxos": [utxo(u64::MAX), utxo(1)] },
            "signedTx": "00"
        }).to_string()).unwrap();

        assert_eq!(p.create_signed_tx(&[TransactionOutput::new("51", 1)], None).await.unwrap(), json!("00"));
        assert_eq!(p.create_signed_tx(&[TransactionOutput::new("51", u64::MAX)], None).await.unwrap(), json!("00"));
    }
}
