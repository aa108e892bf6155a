//! BCH wallet bridge: the single, validated entry point a DApp uses to talk to a
//! pluggable Bitcoin Cash wallet provider.
//!
//! # Architecture
//!
//! ```text
//! DApp
//!   │
//!   ▼
//! WalletBridge<P>  (argument checks, default DApp id, result shape checks)
//!   │
//!   ├── address  (CashAddr / legacy format collaborators)
//!   ├── network  (magic -> Network)
//!   │
//!   ▼
//! P: WalletProvider  (keys, UTXO set, signing; any backend)
//! ```
//!
//! # Errors
//!
//! | Kind | When |
//! |------|------|
//! | `IllegalArgument` | caller input broke a pre-condition; provider not called |
//! | `Provider` | provider failed, returned a malformed value, or is missing |
//!
//! # Features
//!
//! - `native` (default) - tokio file loading for fixtures, log subscriber, `bch-bridge` CLI
//!
//! # Usage
//!
//! ```ignore
//! use bch_wallet_bridge::{BridgeConfig, ChangeType, FixtureProvider, WalletBridge};
//!
//! let provider = FixtureProvider::load("wallet.json").await?;
//! let bridge = WalletBridge::from_config(provider, BridgeConfig::new().with_default_dapp_id(dapp_id))?;
//!
//! let address = bridge.get_address(ChangeType::Receive, None, None).await?;
//! let balance = bridge.get_balance(None).await?;
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod address;
pub mod bridge;
pub mod config;
pub mod entities;
pub mod error;
pub mod network;
pub mod provider;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

pub use address::{AddressError, AddressFormat, AddressKind, CashAddress};
pub use bridge::WalletBridge;
pub use config::BridgeConfig;
pub use entities::{is_dapp_id, ChangeType, TransactionOutput, Utxo, MAX_ADDRESS_INDEX};
pub use error::{BridgeError, BridgeResult};
pub use network::{find_network, Network, NetworkType, MAINNET_MAGIC, TESTNET3_MAGIC};
pub use provider::{FixtureProvider, WalletFixture, WalletProvider};
