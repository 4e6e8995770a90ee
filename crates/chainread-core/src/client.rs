//! Per-endpoint EVM read client.
//!
//! [`EvmRpcClient`] is the capability the failover layer drives: one endpoint,
//! one operation, a result or an error. [`JsonRpcEvmClient`] implements it on
//! top of any [`RpcTransport`].

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ReadError;
use crate::request::RequestIds;
use crate::transport::RpcTransport;
use crate::types::{parse_hex_u64, Block, Log, LogFilter, TransactionReceipt};

/// Single-endpoint EVM read operations.
///
/// Object-safe; the provider set stores clients as `Arc<dyn EvmRpcClient>`.
#[async_trait]
pub trait EvmRpcClient: Send + Sync {
    /// The endpoint this client talks to.
    fn url(&self) -> &str;

    /// `eth_call` against the latest block; returns the raw return data.
    async fn call(&self, to: &str, calldata: &[u8]) -> Result<Vec<u8>, ReadError>;

    /// `eth_getLogs`.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ReadError>;

    /// `eth_blockNumber`.
    async fn get_block_number(&self) -> Result<u64, ReadError>;

    /// `eth_getBlockByNumber` without transaction bodies. `None` if the node
    /// does not know the block.
    async fn get_block(&self, number: u64) -> Result<Option<Block>, ReadError>;

    /// `eth_getTransactionReceipt`. `None` if the node has no receipt.
    async fn get_transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, ReadError>;
}

/// `EvmRpcClient` over a JSON-RPC transport.
pub struct JsonRpcEvmClient<T> {
    transport: T,
    ids: RequestIds,
}

impl<T: RpcTransport> JsonRpcEvmClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            ids: RequestIds::new(),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> ReadError {
        ReadError::InvalidResponse {
            url: self.transport.url().to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl<T: RpcTransport> EvmRpcClient for JsonRpcEvmClient<T> {
    fn url(&self) -> &str {
        self.transport.url()
    }

    async fn call(&self, to: &str, calldata: &[u8]) -> Result<Vec<u8>, ReadError> {
        let params = vec![
            json!({ "to": to, "data": format!("0x{}", hex::encode(calldata)) }),
            json!("latest"),
        ];
        let out: String = self.transport.call(self.ids.next(), "eth_call", params).await?;
        hex::decode(out.trim_start_matches("0x"))
            .map_err(|e| self.invalid(format!("eth_call returned non-hex data: {e}")))
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ReadError> {
        let logs: Vec<Log> = self
            .transport
            .call(self.ids.next(), "eth_getLogs", vec![filter.to_json()])
            .await?;
        Ok(logs)
    }

    async fn get_block_number(&self) -> Result<u64, ReadError> {
        let hex_number: String = self
            .transport
            .call(self.ids.next(), "eth_blockNumber", vec![])
            .await?;
        parse_hex_u64(&hex_number)
            .ok_or_else(|| self.invalid(format!("bad block number '{hex_number}'")))
    }

    async fn get_block(&self, number: u64) -> Result<Option<Block>, ReadError> {
        let params = vec![json!(format!("{number:#x}")), json!(false)];
        let raw: Value = self
            .transport
            .call(self.ids.next(), "eth_getBlockByNumber", params)
            .await?;
        if raw.is_null() {
            return Ok(None);
        }
        Block::from_json(&raw)
            .map(Some)
            .ok_or_else(|| self.invalid(format!("malformed block {number}")))
    }

    async fn get_transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, ReadError> {
        let receipt: Option<TransactionReceipt> = self
            .transport
            .call(self.ids.next(), "eth_getTransactionReceipt", vec![json!(hash)])
            .await?;
        Ok(receipt)
    }
}
