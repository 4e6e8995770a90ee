//! Error types for transports and chain reads.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while talking to a single endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by chain-level read operations.
#[derive(Debug, Error)]
pub enum ReadError {
    /// A single endpoint failed. Recovered by the failover iterator; only
    /// surfaced when a client is used directly.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// ABI encoding/decoding failed, or the method/event is not in the ABI.
    #[error("ABI error: {0}")]
    Abi(String),

    /// The endpoint answered with something that is not a valid response.
    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// A provider set was built without any endpoint.
    #[error("Chain '{chain}' has no RPC endpoints")]
    NoEndpoints { chain: String },

    /// Every endpoint answered, but none of them had a value.
    #[error("Not found on any endpoint: {what}")]
    NotFound { what: String },

    /// Every endpoint failed.
    #[error("All {attempts} endpoints failed for chain '{chain}': {last_error}")]
    AllEndpointsExhausted {
        chain: String,
        attempts: usize,
        last_error: String,
    },

    /// Invalid chain configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl ReadError {
    /// Returns `true` if no endpoint could be reached.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::AllEndpointsExhausted { .. })
    }

    /// Returns `true` if the endpoints answered but had nothing to return.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
