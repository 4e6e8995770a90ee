//! chainread-core — failover reads over redundant EVM JSON-RPC endpoints.
//!
//! # Overview
//!
//! A chain is described by a name, a chain id and an ordered list of RPC
//! endpoints. The core crate defines:
//!
//! - [`ProviderSet`] — one chain's endpoints, tried in priority order until
//!   one answers, plus the timestamp → block resolver
//! - [`Contract`] / [`ContractBinding`] — ABI-encoded contract reads and event
//!   log filters routed through a provider set
//! - [`EvmRpcClient`] — the single-endpoint capability a provider set drives,
//!   with [`JsonRpcEvmClient`] implementing it over any [`RpcTransport`]
//! - [`Outcome`] — the tagged result of one failover pass
//! - [`ProviderRegistry`] / [`AbiRegistry`] / [`ReadContext`] — name lookups
//! - [`ChainsConfig`] — JSON chain configuration

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod outcome;
pub mod provider_set;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod transport;
pub mod types;

pub use client::{EvmRpcClient, JsonRpcEvmClient};
pub use config::ChainsConfig;
pub use contract::{Contract, ContractBinding};
pub use error::{ReadError, TransportError};
pub use outcome::Outcome;
pub use provider_set::ProviderSet;
pub use registry::{AbiRegistry, ProviderRegistry, ReadContext};
pub use request::{JsonRpcRequest, JsonRpcResponse, RpcId};
pub use resolver::DAY_SECS;
pub use transport::RpcTransport;
pub use types::{Block, BlockTag, ChainDescriptor, Log, LogFilter, TransactionReceipt};

// ABI types that appear in the public API.
pub use alloy_dyn_abi::DynSolValue;
pub use alloy_json_abi::JsonAbi;
