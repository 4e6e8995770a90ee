//! HTTP JSON-RPC transport backed by `reqwest`.
//!
//! One client per endpoint. The only reliability feature here is the request
//! timeout; falling back to other endpoints is the provider set's job.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use chainread_core::error::TransportError;
use chainread_core::request::{JsonRpcRequest, JsonRpcResponse};
use chainread_core::transport::RpcTransport;

/// Configuration for `HttpRpcClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Per-request timeout, covering connect, send and body read.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// HTTP JSON-RPC transport for a single endpoint.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpRpcClient {
    /// Create a client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: &HttpClientConfig) -> Result<Self, TransportError> {
        let request_timeout = config.request_timeout();
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("building HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            request_timeout,
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, &HttpClientConfig::default())
    }

    fn map_reqwest(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        tracing::trace!(url = %self.url, method = %req.method, id = %req.id, "sending request");
        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        let body = resp.bytes().await.map_err(|e| self.map_reqwest(e))?;
        Ok(serde_json::from_slice::<JsonRpcResponse>(&body)?)
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(HttpClientConfig::default().request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn config_timeout_defaults_when_absent() {
        let config: HttpClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn client_keeps_url() {
        let client = HttpRpcClient::default_for("https://api.avax.network/ext/bc/C/rpc").unwrap();
        assert_eq!(client.url(), "https://api.avax.network/ext/bc/C/rpc");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        let config = HttpClientConfig {
            request_timeout_secs: 2,
        };
        // port 9 (discard) on localhost is closed on test machines
        let client = HttpRpcClient::new("http://127.0.0.1:9", &config).unwrap();
        let err = client
            .send(JsonRpcRequest::new(1, "eth_blockNumber", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Http(_) | TransportError::Timeout { .. }));
    }
}
