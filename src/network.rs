//! Network identification from the provider's magic bytes.

use serde::{Deserialize, Serialize};

pub const MAINNET_MAGIC: u32 = 0xE3E1_F3E8;
pub const TESTNET3_MAGIC: u32 = 0x0B11_0907;

const NETWORKS: &[(u32, NetworkType)] = &[
    (MAINNET_MAGIC, NetworkType::Mainnet),
    (TESTNET3_MAGIC, NetworkType::Testnet3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType { Mainnet, Testnet3, Unknown }

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self { NetworkType::Mainnet => "Mainnet", NetworkType::Testnet3 => "Testnet3", NetworkType::Unknown => "Unknown" }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    pub magic: u32,
    pub name: NetworkType,
}

impl Network {
    /// Magic as the hex string wallets usually display (`e3e1f3e8`).
    pub fn magic_hex(&self) -> String { format!("{:08x}", self.magic) }
}

/// Total lookup: unlisted magics map to `Unknown`.
pub fn find_network(magic: u32) -> Network {
    let name = NETWORKS.iter().find(|(m, _)| *m == magic).map(|(_, n)| *n).unwrap_or(NetworkType::Unknown);
    Network { magic, name }
}
