//! Records exchanged between DApps, the bridge and the provider.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Highest non-hardened BIP44 address index (2^31 - 1).
pub const MAX_ADDRESS_INDEX: u32 = 0x7FFF_FFFF;

static DAPP_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{64}$").expect("static regex"));

/// True if `id` has the shape of a transaction hash (64 hex characters).
pub fn is_dapp_id(id: &str) -> bool { DAPP_ID_RE.is_match(id) }

/// BIP44 change branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    #[default]
    Receive,
    Change,
}

impl ChangeType {
    /// Branch index in the derivation path (`m/44'/145'/0'/<index>/*`).
    pub fn index(&self) -> u32 {
        match self { ChangeType::Receive => 0, ChangeType::Change => 1 }
    }

    pub fn as_str(&self) -> &'static str {
        match self { ChangeType::Receive => "receive", ChangeType::Change => "change" }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "receive" | "0" => Some(ChangeType::Receive),
            "change" | "1" => Some(ChangeType::Change),
            _ => None,
        }
    }
}

/// Unspent transaction output as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    #[serde(alias = "txId", alias = "transactionId")]
    pub txid: String,
    pub output_index: u32,
    pub address: String,
    /// ScriptPubKey, hex
    pub script: String,
    #[serde(alias = "valueSatoshis")]
    pub satoshis: u64,
}

impl Utxo {
    pub fn new(txid: impl Into<String>, output_index: u32, address: impl Into<String>, script: impl Into<String>, satoshis: u64) -> Self {
        Self { txid: txid.into(), output_index, address: address.into(), script: script.into(), satoshis }
    }

    pub fn outpoint(&self) -> String { format!("{}:{}", self.txid, self.output_index) }
}

/// Output requested by a DApp when building a transaction. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    /// Lock script, hex
    pub lock_script: String,
    /// Amount in satoshis
    #[serde(alias = "amountSatoshis")]
    pub amount: u64,
}

impl TransactionOutput {
    pub fn new(lock_script: impl Into<String>, amount: u64) -> Self { Self { lock_script: lock_script.into(), amount } }
}
