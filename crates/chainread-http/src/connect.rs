//! Build provider sets whose endpoints are reached over HTTP.

use std::sync::Arc;

use chainread_core::{
    ChainDescriptor, ChainsConfig, EvmRpcClient, JsonRpcEvmClient, ProviderRegistry,
    ProviderSet, ReadError,
};

use crate::client::{HttpClientConfig, HttpRpcClient};

/// An `EvmRpcClient` for one HTTP endpoint.
pub fn evm_client(url: &str, config: &HttpClientConfig) -> Result<Arc<dyn EvmRpcClient>, ReadError> {
    let transport = HttpRpcClient::new(url, config)?;
    Ok(Arc::new(JsonRpcEvmClient::new(transport)))
}

/// A provider set with one HTTP client per endpoint of `descriptor`.
pub fn provider_set(descriptor: ChainDescriptor, config: &HttpClientConfig) -> Result<ProviderSet, ReadError> {
    tracing::debug!(
        chain = %descriptor.name,
        endpoints = descriptor.rpc.len(),
        "connecting provider set"
    );
    ProviderSet::connect_with(descriptor, |url| evm_client(url, config))
}

/// A registry holding an HTTP provider set for every configured chain.
pub fn provider_registry(chains: &ChainsConfig, config: &HttpClientConfig) -> Result<ProviderRegistry, ReadError> {
    ProviderRegistry::from_config(chains, |url| evm_client(url, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_set_keeps_endpoint_order() {
        let descriptor = ChainDescriptor::new(
            "avalanche",
            vec![
                "https://api.avax.network/ext/bc/C/rpc".into(),
                "https://rpc.ankr.com/avalanche".into(),
            ],
            43114,
        );
        let set = provider_set(descriptor, &HttpClientConfig::default()).unwrap();
        assert_eq!(set.endpoints()[0], "https://api.avax.network/ext/bc/C/rpc");
        assert_eq!(set.endpoints()[1], "https://rpc.ankr.com/avalanche");
    }

    #[test]
    fn registry_from_config() {
        let chains = ChainsConfig::from_json(
            r#"{"chains":[{"name":"bsc","rpc":["https://bsc-dataseed.binance.org"],"chain_id":56}]}"#,
        )
        .unwrap();
        let registry = provider_registry(&chains, &HttpClientConfig::default()).unwrap();
        assert_eq!(registry.get("bsc").unwrap().chain_id(), 56);
    }

    #[tokio::test]
    async fn dead_endpoints_exhaust() {
        let config = HttpClientConfig {
            request_timeout_secs: 2,
        };
        let descriptor = ChainDescriptor::new(
            "local",
            vec!["http://127.0.0.1:9".into(), "http://127.0.0.1:9/alt".into()],
            1337,
        );
        let set = provider_set(descriptor, &config).unwrap();
        let err = set.get_block_number().await.unwrap_err();
        assert!(err.is_exhausted());
    }
}
