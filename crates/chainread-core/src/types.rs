//! Shared chain data types.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// ─── ChainDescriptor ──────────────────────────────────────────────────────────

/// Static description of one chain: its name, its RPC endpoints in priority
/// order and its chain id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    /// Unique chain name (e.g. `"avalanche"`).
    pub name: String,
    /// Endpoint URLs, first tried first.
    pub rpc: Vec<String>,
    /// EIP-155 chain id.
    pub chain_id: u64,
}

impl ChainDescriptor {
    pub fn new(name: impl Into<String>, rpc: Vec<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            rpc,
            chain_id,
        }
    }
}

// ─── Block ────────────────────────────────────────────────────────────────────

/// The parts of a block the read layer cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block number.
    pub number: u64,
    /// Block hash (`0x…`).
    pub hash: String,
    /// Unix timestamp of the block (seconds since epoch).
    pub timestamp: u64,
}

impl Block {
    /// Convert an `eth_getBlockByNumber` JSON object to a `Block`.
    ///
    /// Returns `None` for `null` (unknown block) or a malformed object.
    pub fn from_json(v: &Value) -> Option<Self> {
        Some(Self {
            number: parse_hex_u64(v["number"].as_str()?)?,
            hash: v["hash"].as_str()?.to_string(),
            timestamp: parse_hex_u64(v["timestamp"].as_str()?)?,
        })
    }
}

// ─── Log ──────────────────────────────────────────────────────────────────────

/// A raw EVM log as returned by `eth_getLogs`.
///
/// Position fields are `None` for logs of pending transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    #[serde(rename = "blockNumber", default)]
    pub block_number: Option<String>,
    #[serde(rename = "blockHash", default)]
    pub block_hash: Option<String>,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    #[serde(rename = "logIndex", default)]
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: Option<bool>,
}

// ─── TransactionReceipt ───────────────────────────────────────────────────────

/// A transaction receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    #[serde(rename = "blockNumber")]
    pub block_number: String,
    /// `0x1` on success, `0x0` on revert; absent before Byzantium.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
    #[serde(default)]
    pub logs: Vec<Log>,
}

impl TransactionReceipt {
    /// Returns `true` if the transaction succeeded. Pre-Byzantium receipts
    /// carry no status and count as successful.
    pub fn succeeded(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| parse_hex_u64(s) == Some(1))
            .unwrap_or(true)
    }
}

// ─── LogFilter ────────────────────────────────────────────────────────────────

/// A block reference accepted by `eth_getLogs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Number(u64),
    Earliest,
    Latest,
    Pending,
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_str(&format!("{n:#x}")),
            Self::Earliest => serializer.serialize_str("earliest"),
            Self::Latest => serializer.serialize_str("latest"),
            Self::Pending => serializer.serialize_str("pending"),
        }
    }
}

impl From<u64> for BlockTag {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

/// Raw `eth_getLogs` filter.
///
/// `topics` is positional; a `None` entry matches any value at that position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<Option<String>>,
    #[serde(rename = "fromBlock", skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockTag>,
    #[serde(rename = "toBlock", skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockTag>,
}

impl LogFilter {
    /// Create a filter for a single contract address.
    pub fn address(addr: impl Into<String>) -> Self {
        Self {
            address: Some(addr.into()),
            ..Default::default()
        }
    }

    /// Append a topic at the next position (`None` = wildcard).
    pub fn topic(mut self, topic: Option<String>) -> Self {
        self.topics.push(topic);
        self
    }

    /// Set the start block.
    pub fn from_block(mut self, block: impl Into<BlockTag>) -> Self {
        self.from_block = Some(block.into());
        self
    }

    /// Set the end block.
    pub fn to_block(mut self, block: impl Into<BlockTag>) -> Self {
        self.to_block = Some(block.into());
        self
    }

    /// The JSON object sent as the single `eth_getLogs` parameter.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Parse a hex-encoded quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).ok()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
