//! WalletProvider - the pluggable wallet backend the bridge delegates to.
//!
//! Providers evolve independently of the bridge, so their answers are treated as
//! untrusted JSON documents. The bridge checks every shape before handing typed values
//! back to the DApp.
//!
//! | Method | Expected answer |
//! |--------|-----------------|
//! | `get_addresses` | non-empty array of CashAddr strings |
//! | `get_address_index` | integer in `[0, 2^31 - 1]` |
//! | `get_redeem_scripts` | array of hex strings |
//! | `add_redeem_script` | nothing (`None`) |
//! | `get_spendable_utxos` / `get_unspendable_utxos` | array of UTXO objects |
//! | `sign` | DER signature, hex string |
//! | `create_signed_tx` | serialized transaction, hex string |
//! | `get_protocol_version` | number |
//! | `get_network_magic` | number |
//! | `get_fee_per_byte` | integer >= 1 |

pub mod fixture;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{ChangeType, TransactionOutput};

pub use fixture::{FixtureProvider, WalletFixture};

#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn get_addresses(&self, change: ChangeType, size: u32, start_index: Option<u32>, dapp_id: Option<&str>) -> Result<Value>;
    async fn get_address_index(&self, change: ChangeType, dapp_id: Option<&str>) -> Result<Value>;
    async fn get_redeem_scripts(&self, dapp_id: Option<&str>) -> Result<Value>;
    /// `Ok(None)` acknowledges the write; any payload is a protocol violation.
    async fn add_redeem_script(&self, redeem_script: &str, dapp_id: Option<&str>) -> Result<Option<Value>>;
    async fn get_spendable_utxos(&self, dapp_id: Option<&str>) -> Result<Value>;
    async fn get_unspendable_utxos(&self, dapp_id: &str) -> Result<Value>;
    async fn sign(&self, address: &str, data_hex: &str) -> Result<Value>;
    async fn create_signed_tx(&self, outputs: &[TransactionOutput], dapp_id: Option<&str>) -> Result<Value>;
    async fn get_protocol_version(&self) -> Result<Value>;
    async fn get_network_magic(&self) -> Result<Value>;
    async fn get_fee_per_byte(&self) -> Result<Value>;
}

#[async_trait]
impl<P: WalletProvider + ?Sized> WalletProvider for std::sync::Arc<P> {
    async fn get_addresses(&self, change: ChangeType, size: u32, start_index: Option<u32>, dapp_id: Option<&str>) -> Result<Value> {
        (**self).get_addresses(change, size, start_index, dapp_id).await
    }
    async fn get_address_index(&self, change: ChangeType, dapp_id: Option<&str>) -> Result<Value> {
        (**self).get_address_index(change, dapp_id).await
    }
    async fn get_redeem_scripts(&self, dapp_id: Option<&str>) -> Result<Value> { (**self).get_redeem_scripts(dapp_id).await }
    async fn add_redeem_script(&self, redeem_script: &str, dapp_id: Option<&str>) -> Result<Option<Value>> {
        (**self).add_redeem_script(redeem_script, dapp_id).await
    }
    async fn get_spendable_utxos(&self, dapp_id: Option<&str>) -> Result<Value> { (**self).get_spendable_utxos(dapp_id).await }
    async fn get_unspendable_utxos(&self, dapp_id: &str) -> Result<Value> { (**self).get_unspendable_utxos(dapp_id).await }
    async fn sign(&self, address: &str, data_hex: &str) -> Result<Value> { (**self).sign(address, data_hex).await }
    async fn create_signed_tx(&self, outputs: &[TransactionOutput], dapp_id: Option<&str>) -> Result<Value> {
        (**self).create_signed_tx(outputs, dapp_id).await
    }
    async fn get_protocol_version(&self) -> Result<Value> { (**self).get_protocol_version().await }
    async fn get_network_magic(&self) -> Result<Value> { (**self).get_network_magic().await }
    async fn get_fee_per_byte(&self) -> Result<Value> { (**self).get_fee_per_byte().await }
}
