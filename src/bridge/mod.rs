//! WalletBridge - validated, typed front of a [`WalletProvider`].
//!
//! Every operation runs the same three steps:
//!
//! ```text
//! DApp args ──validate──▶ IllegalArgument (provider untouched)
//!     │
//!     ▼
//! WalletProvider call ──reject──▶ Provider(original error)
//!     │
//!     ▼
//! shape check ──mismatch──▶ Provider(description)
//!     │
//!     ▼
//! typed result
//! ```
//!
//! The only bridge-local state is the default DApp id. An explicit id passed to an
//! operation overrides it for that call only.

mod validate;

use std::sync::RwLock;

use tracing::{debug, warn};

use crate::address::{self, AddressFormat, AddressKind, CashAddress};
use crate::config::BridgeConfig;
use crate::entities::{is_dapp_id, ChangeType, TransactionOutput, Utxo, MAX_ADDRESS_INDEX};
use crate::error::{BridgeError, BridgeResult};
use crate::network::{find_network, Network};
use crate::provider::WalletProvider;

pub struct WalletBridge<P> {
    provider: Option<P>,
    default_dapp_id: RwLock<Option<String>>,
    parallel_utxo_queries: bool,
}

impl<P: WalletProvider> WalletBridge<P> {
    pub fn new(provider: P) -> Self {
        Self { provider: Some(provider), default_dapp_id: RwLock::new(None), parallel_utxo_queries: true }
    }

    /// Bridge without a provider. Every delegating operation fails with a provider error.
    pub fn unbound() -> Self {
        Self { provider: None, default_dapp_id: RwLock::new(None), parallel_utxo_queries: true }
    }

    pub fn from_config(provider: P, config: BridgeConfig) -> BridgeResult<Self> {
        let bridge = Self { parallel_utxo_queries: config.parallel_utxo_queries, ..Self::new(provider) };
        bridge.set_default_dapp_id(config.default_dapp_id.as_deref())?;
        Ok(bridge)
    }

    pub fn wallet_provider(&self) -> Option<&P> { self.provider.as_ref() }

    fn provider(&self) -> BridgeResult<&P> {
        self.provider.as_ref().ok_or_else(|| BridgeError::provider("no wallet provider is bound"))
    }

    /// Explicit id, else the default. An empty explicit id counts as absent.
    fn effective_dapp_id(&self, explicit: Option<&str>) -> Option<String> {
        match explicit {
            Some(id) if !id.is_empty() => Some(id.to_string()),
            _ => self.get_default_dapp_id(),
        }
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Address at `index` on the given branch (the provider's current index if `None`).
    pub async fn get_address(&self, change: ChangeType, index: Option<u32>, dapp_id: Option<&str>) -> BridgeResult<String> {
        let addresses = self.get_addresses(change, index, Some(1), dapp_id).await?;
        addresses.into_iter().next().ok_or_else(|| BridgeError::provider("getAddresses: the return value is invalid"))
    }

    pub async fn get_address_index(&self, change: ChangeType, dapp_id: Option<&str>) -> BridgeResult<u32> {
        let provider = self.provider()?;
        let dapp = self.effective_dapp_id(dapp_id);
        debug!(op = "getAddressIndex", change = change.as_str(), has_dapp_id = dapp.is_some(), "Delegating to provider");
        let value = provider.get_address_index(change, dapp.as_deref()).await.map_err(rejected("getAddressIndex"))?;
        validate::address_index("getAddressIndex", value)
    }

    /// `size` addresses from `start_index` (defaults: one address, provider's current index).
    pub async fn get_addresses(&self, change: ChangeType, start_index: Option<u32>, size: Option<u32>, dapp_id: Option<&str>) -> BridgeResult<Vec<String>> {
        if let Some(start) = start_index {
            if start > MAX_ADDRESS_INDEX {
                return Err(BridgeError::illegal_argument("startIndex is an invalid value."));
            }
        }
        if let Some(size) = size {
            if size < 1 {
                return Err(BridgeError::illegal_argument("size is an invalid value"));
            }
        }
        if let (Some(start), Some(size)) = (start_index, size) {
            if u64::from(start) + u64::from(size) > u64::from(MAX_ADDRESS_INDEX) {
                return Err(BridgeError::illegal_argument(format!("the max index must be <= {MAX_ADDRESS_INDEX}")));
            }
        }

        let provider = self.provider()?;
        let dapp = self.effective_dapp_id(dapp_id);
        debug!(op = "getAddresses", change = change.as_str(), ?start_index, ?size, has_dapp_id = dapp.is_some(), "Delegating to provider");
        let value = provider.get_addresses(change, size.unwrap_or(1), start_index, dapp.as_deref()).await
            .map_err(rejected("getAddresses"))?;
        validate::string_array("getAddresses", value, true)
    }

    // =========================================================================
    // Redeem scripts
    // =========================================================================

    /// First stored script whose P2SH CashAddr equals `p2sh_address`, if any.
    pub async fn get_redeem_script(&self, p2sh_address: &str, dapp_id: Option<&str>) -> BridgeResult<Option<String>> {
        if !is_p2sh_cash_address(p2sh_address) {
            return Err(BridgeError::illegal_argument("The address is not P2SH Address or Cash Address."));
        }
        // Compared in canonical form, so bare or upper-case input matches too (looser than a verbatim string match).
        let wanted = CashAddress::decode(p2sh_address)
            .and_then(|a| a.encode())
            .map_err(|e| BridgeError::illegal_argument(format!("The address is not P2SH Address or Cash Address. ({e})")))?;

        let scripts = self.get_redeem_scripts(dapp_id).await?;
        Ok(scripts.into_iter().find(|script| {
            address::cash_address_from_script(script).map(|derived| derived == wanted).unwrap_or(false)
        }))
    }

    pub async fn get_redeem_scripts(&self, dapp_id: Option<&str>) -> BridgeResult<Vec<String>> {
        let provider = self.provider()?;
        let dapp = self.effective_dapp_id(dapp_id);
        debug!(op = "getRedeemScripts", has_dapp_id = dapp.is_some(), "Delegating to provider");
        let value = provider.get_redeem_scripts(dapp.as_deref()).await.map_err(rejected("getRedeemScripts"))?;
        validate::string_array("getRedeemScripts", value, false)
    }

    pub async fn add_redeem_script(&self, redeem_script: &str, dapp_id: Option<&str>) -> BridgeResult<()> {
        if redeem_script.is_empty() {
            return Err(BridgeError::illegal_argument("The redeemScript cannot be empty."));
        }
        let provider = self.provider()?;
        let dapp = self.effective_dapp_id(dapp_id);
        debug!(op = "addRedeemScript", has_dapp_id = dapp.is_some(), "Delegating to provider");
        let ack = provider.add_redeem_script(redeem_script, dapp.as_deref()).await.map_err(rejected("addRedeemScript"))?;
        validate::nothing("addRedeemScript", ack)
    }

    // =========================================================================
    // UTXOs
    // =========================================================================

    /// With a DApp id: unspendable UTXOs first, then spendable. Without: spendable only.
    ///
    /// Only an explicit id selects the two-query form; the default id is not consulted.
    pub async fn get_utxos(&self, dapp_id: Option<&str>) -> BridgeResult<Vec<Utxo>> {
        let provider = self.provider()?;
        let Some(dapp) = dapp_id.filter(|id| !id.is_empty()) else {
            debug!(op = "getSpendableUtxos", has_dapp_id = false, "Delegating to provider");
            let value = provider.get_spendable_utxos(None).await.map_err(rejected("getSpendableUtxos"))?;
            return validate::utxo_array("getSpendableUtxos", value);
        };

        debug!(op = "getUtxos", parallel = self.parallel_utxo_queries, "Querying unspendable and spendable UTXOs");
        let (unspendable, spendable) = if self.parallel_utxo_queries {
            futures::future::join(provider.get_unspendable_utxos(dapp), provider.get_spendable_utxos(Some(dapp))).await
        } else {
            let unspendable = provider.get_unspendable_utxos(dapp).await.map_err(rejected("getUnspendableUtxos"))?;
            (Ok(unspendable), provider.get_spendable_utxos(Some(dapp)).await)
        };

        let mut utxos = validate::utxo_array("getUnspendableUtxos", unspendable.map_err(rejected("getUnspendableUtxos"))?)?;
        utxos.extend(validate::utxo_array("getSpendableUtxos", spendable.map_err(rejected("getSpendableUtxos"))?)?);
        Ok(utxos)
    }

    /// Sum of `satoshis` over [`get_utxos`](Self::get_utxos).
    pub async fn get_balance(&self, dapp_id: Option<&str>) -> BridgeResult<u64> {
        let utxos = self.get_utxos(dapp_id).await?;
        utxos.iter()
            .try_fold(0u64, |acc, u| acc.checked_add(u.satoshis))
            .ok_or_else(|| BridgeError::provider("UTXO values overflow the balance"))
    }

    // =========================================================================
    // Signing and transactions
    // =========================================================================

    /// Signs hex `data_to_sign` with the key behind `address` (CashAddr). Returns a DER hex signature.
    pub async fn sign(&self, address: &str, data_to_sign: &str) -> BridgeResult<String> {
        if !is_cash_address(address) {
            return Err(BridgeError::illegal_argument("The address is not Cash Address format."));
        }
        if data_to_sign.is_empty() {
            return Err(BridgeError::illegal_argument("The dataToSign cannot be empty."));
        }
        let provider = self.provider()?;
        debug!(op = "sign", address, "Delegating to provider");
        let value = provider.sign(address, data_to_sign).await.map_err(rejected("sign"))?;
        validate::string("sign", value)
    }

    /// Signed raw transaction (hex) paying exactly `outputs`, in order.
    pub async fn build_transaction(&self, outputs: &[TransactionOutput], dapp_id: Option<&str>) -> BridgeResult<String> {
        if outputs.is_empty() {
            return Err(BridgeError::illegal_argument("The outputs cannot be empty."));
        }
        self.create_signed_tx(outputs, dapp_id).await
    }

    async fn create_signed_tx(&self, outputs: &[TransactionOutput], dapp_id: Option<&str>) -> BridgeResult<String> {
        let provider = self.provider()?;
        let dapp = self.effective_dapp_id(dapp_id);
        debug!(op = "createSignedTx", outputs = outputs.len(), has_dapp_id = dapp.is_some(), "Delegating to provider");
        let value = provider.create_signed_tx(outputs, dapp.as_deref()).await.map_err(rejected("createSignedTx"))?;
        validate::string("createSignedTx", value)
    }

    // =========================================================================
    // Network
    // =========================================================================

    pub async fn get_protocol_version(&self) -> BridgeResult<i32> {
        let provider = self.provider()?;
        let value = provider.get_protocol_version().await.map_err(rejected("getProtocolVersion"))?;
        validate::protocol_version("getProtocolVersion", value)
    }

    pub async fn get_network(&self) -> BridgeResult<Network> {
        let provider = self.provider()?;
        let value = provider.get_network_magic().await.map_err(rejected("getNetworkMagic"))?;
        Ok(find_network(validate::network_magic("getNetworkMagic", value)?))
    }

    /// Fee rate in satoshis per byte.
    pub async fn get_fee_per_byte(&self) -> BridgeResult<u64> {
        let provider = self.provider()?;
        let value = provider.get_fee_per_byte().await.map_err(rejected("getFeePerByte"))?;
        validate::fee_per_byte("getFeePerByte", value)
    }

    // =========================================================================
    // Default DApp id
    // =========================================================================

    pub fn get_default_dapp_id(&self) -> Option<String> {
        self.default_dapp_id.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Replaces the default id. On error the previous value is kept.
    pub fn set_default_dapp_id(&self, dapp_id: Option<&str>) -> BridgeResult<()> {
        if let Some(id) = dapp_id {
            if !is_dapp_id(id) {
                return Err(BridgeError::illegal_argument("The dAppId is invalid."));
            }
        }
        *self.default_dapp_id.write().unwrap_or_else(|p| p.into_inner()) = dapp_id.map(str::to_string);
        debug!(has_dapp_id = dapp_id.is_some(), "Default DApp id changed");
        Ok(())
    }
}

fn rejected(op: &'static str) -> impl Fn(anyhow::Error) -> BridgeError {
    move |e| {
        warn!(op, error = %e, "Provider call failed");
        BridgeError::from_provider(e)
    }
}

fn is_cash_address(input: &str) -> bool { matches!(address::detect_format(input), Ok(AddressFormat::Cash)) }

fn is_p2sh_cash_address(input: &str) -> bool {
    is_cash_address(input) && matches!(address::detect_kind(input), Ok(AddressKind::P2SH))
}
