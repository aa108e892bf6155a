//! Bridge configuration - built by the embedding application

/// Bridge configuration. The embedding DApp host constructs this.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// DApp id used when an operation does not name one. Must be 64 hex characters.
    pub default_dapp_id: Option<String>,
    /// Query unspendable and spendable UTXOs concurrently.
    pub parallel_utxo_queries: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self { Self { default_dapp_id: None, parallel_utxo_queries: true } }
}

impl BridgeConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_default_dapp_id(mut self, id: impl Into<String>) -> Self { self.default_dapp_id = Some(id.into()); self }
    pub fn with_sequential_utxo_queries(mut self) -> Self { self.parallel_utxo_queries = false; self }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_parallel_queries_without_dapp_id() {
        let config = BridgeConfig::new();
        assert!(config.parallel_utxo_queries);
        assert!(config.default_dapp_id.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let config = BridgeConfig::new().with_default_dapp_id("ab").with_sequential_utxo_queries();
        assert_eq!(config.default_dapp_id.as_deref(), Some("ab"));
        assert!(!config.parallel_utxo_queries);
    }
}
