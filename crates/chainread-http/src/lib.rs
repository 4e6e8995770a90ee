//! chainread-http — HTTP transport for chainread.
//!
//! ```rust,no_run
//! use chainread_core::ChainDescriptor;
//! use chainread_http::{provider_set, HttpClientConfig};
//!
//! # async fn run() -> Result<(), chainread_core::ReadError> {
//! let avalanche = provider_set(
//!     ChainDescriptor::new(
//!         "avalanche",
//!         vec![
//!             "https://api.avax.network/ext/bc/C/rpc".into(),
//!             "https://rpc.ankr.com/avalanche".into(),
//!         ],
//!         43114,
//!     ),
//!     &HttpClientConfig::default(),
//! )?;
//! let yesterday = avalanche.blocks_in_last_24_hours().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connect;

pub use client::{HttpClientConfig, HttpRpcClient};
pub use connect::{evm_client, provider_registry, provider_set};
