//! Name-keyed lookups for provider sets and ABIs.
//!
//! Both registries are plain values: build them at startup, then share them
//! (usually inside a [`ReadContext`]) with whatever needs chain or ABI lookup.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_json_abi::JsonAbi;

use crate::client::EvmRpcClient;
use crate::config::ChainsConfig;
use crate::error::ReadError;
use crate::provider_set::ProviderSet;

// ─── ProviderRegistry ─────────────────────────────────────────────────────────

/// Chain name → provider set.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    chains: HashMap<String, Arc<ProviderSet>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one provider set per configured chain, creating endpoint clients
    /// with `make_client`.
    pub fn from_config<F>(config: &ChainsConfig, mut make_client: F) -> Result<Self, ReadError>
    where
        F: FnMut(&str) -> Result<Arc<dyn EvmRpcClient>, ReadError>,
    {
        let mut registry = Self::new();
        for chain in &config.chains {
            registry.add(ProviderSet::connect_with(chain.clone(), &mut make_client)?);
        }
        Ok(registry)
    }

    /// Register `set` under its chain name, replacing any earlier entry.
    pub fn add(&mut self, set: ProviderSet) -> Arc<ProviderSet> {
        let set = Arc::new(set);
        if self
            .chains
            .insert(set.name().to_string(), Arc::clone(&set))
            .is_some()
        {
            tracing::warn!(chain = set.name(), "provider set replaced");
        }
        set
    }

    pub fn get(&self, chain: &str) -> Option<Arc<ProviderSet>> {
        self.chains.get(chain).cloned()
    }

    /// Like [`get`](Self::get), failing with a config error for unknown chains.
    pub fn require(&self, chain: &str) -> Result<Arc<ProviderSet>, ReadError> {
        self.get(chain).ok_or_else(|| {
            ReadError::Config(format!(
                "unknown chain '{chain}' (known: {})",
                self.names().join(", ")
            ))
        })
    }

    /// Registered chain names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.chains.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

// ─── AbiRegistry ──────────────────────────────────────────────────────────────

/// Name → ABI definition.
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    abis: HashMap<String, Arc<JsonAbi>>,
}

impl AbiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `abi` under `name`, replacing any earlier entry.
    pub fn add(&mut self, name: impl Into<String>, abi: JsonAbi) -> Arc<JsonAbi> {
        let abi = Arc::new(abi);
        self.abis.insert(name.into(), Arc::clone(&abi));
        abi
    }

    /// Parse a standard ABI JSON array and register it under `name`.
    pub fn add_json(&mut self, name: impl Into<String>, abi_json: &str) -> Result<Arc<JsonAbi>, ReadError> {
        let abi: JsonAbi = serde_json::from_str(abi_json)
            .map_err(|e| ReadError::Abi(format!("invalid ABI JSON: {e}")))?;
        Ok(self.add(name, abi))
    }

    pub fn get(&self, name: &str) -> Option<Arc<JsonAbi>> {
        self.abis.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.abis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abis.is_empty()
    }
}

// ─── ReadContext ──────────────────────────────────────────────────────────────

/// Everything a caller needs to resolve chains and ABIs by name.
#[derive(Debug, Default)]
pub struct ReadContext {
    pub providers: ProviderRegistry,
    pub abis: AbiRegistry,
}

impl ReadContext {
    pub fn new(providers: ProviderRegistry, abis: AbiRegistry) -> Self {
        Self { providers, abis }
    }

    /// Provider set for `chain` and ABI named `abi`, both required.
    pub fn resolve(&self, chain: &str, abi: &str) -> Result<(Arc<ProviderSet>, Arc<JsonAbi>), ReadError> {
        let set = self.providers.require(chain)?;
        let abi = self
            .abis
            .get(abi)
            .ok_or_else(|| ReadError::Abi(format!("no ABI registered as '{abi}'")))?;
        Ok((set, abi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Block, ChainDescriptor, Log, LogFilter, TransactionReceipt};
    use async_trait::async_trait;

    struct Idle(String);

    #[async_trait]
    impl EvmRpcClient for Idle {
        fn url(&self) -> &str {
            &self.0
        }
        async fn call(&self, _to: &str, _data: &[u8]) -> Result<Vec<u8>, ReadError> {
            Ok(vec![])
        }
        async fn get_logs(&self, _f: &LogFilter) -> Result<Vec<Log>, ReadError> {
            Ok(vec![])
        }
        async fn get_block_number(&self) -> Result<u64, ReadError> {
            Ok(0)
        }
        async fn get_block(&self, _n: u64) -> Result<Option<Block>, ReadError> {
            Ok(None)
        }
        async fn get_transaction_receipt(
            &self,
            _h: &str,
        ) -> Result<Option<TransactionReceipt>, ReadError> {
            Ok(None)
        }
    }

    fn idle(url: &str) -> Result<Arc<dyn EvmRpcClient>, ReadError> {
        Ok(Arc::new(Idle(url.to_string())))
    }

    fn config() -> ChainsConfig {
        ChainsConfig {
            chains: vec![
                ChainDescriptor::new("polygon", vec!["https://p1".into(), "https://p2".into()], 137),
                ChainDescriptor::new("avalanche", vec!["https://a1".into()], 43114),
            ],
        }
    }

    #[test]
    fn registry_from_config() {
        let registry = ProviderRegistry::from_config(&config(), idle).unwrap();
        assert_eq!(registry.names(), vec!["avalanche", "polygon"]);
        let polygon = registry.get("polygon").unwrap();
        assert_eq!(polygon.chain_id(), 137);
        assert_eq!(polygon.endpoints(), ["https://p1", "https://p2"]);
        assert!(registry.get("fantom").is_none());
    }

    #[test]
    fn unknown_chain_lists_known_ones() {
        let registry = ProviderRegistry::from_config(&config(), idle).unwrap();
        let err = registry.require("fantom").unwrap_err();
        assert!(err.to_string().contains("avalanche, polygon"));
    }

    #[test]
    fn fresh_registries_are_independent() {
        let mut a = AbiRegistry::new();
        a.add_json("empty", "[]").unwrap();
        let b = AbiRegistry::new();
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn invalid_abi_json_rejected() {
        let mut abis = AbiRegistry::new();
        assert!(matches!(abis.add_json("bad", "{not json"), Err(ReadError::Abi(_))));
    }

    #[test]
    fn context_resolves_both() {
        let mut abis = AbiRegistry::new();
        abis.add_json("erc20", "[]").unwrap();
        let ctx = ReadContext::new(ProviderRegistry::from_config(&config(), idle).unwrap(), abis);
        let (set, _abi) = ctx.resolve("avalanche", "erc20").unwrap();
        assert_eq!(set.name(), "avalanche");
        assert!(ctx.resolve("avalanche", "erc721").is_err());
    }
}
