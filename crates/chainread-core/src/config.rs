//! Chain configuration files.
//!
//! ```json
//! {
//!   "chains": [
//!     { "name": "avalanche", "rpc": ["https://api.avax.network/ext/bc/C/rpc"], "chain_id": 43114 }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReadError;
use crate::types::ChainDescriptor;

/// The set of chains a process reads from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsConfig {
    #[serde(default)]
    pub chains: Vec<ChainDescriptor>,
}

impl ChainsConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ReadError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ReadError::Config(format!("invalid chains config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ReadError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReadError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Chain names must be unique and every chain needs an endpoint.
    pub fn validate(&self) -> Result<(), ReadError> {
        let mut seen = HashSet::new();
        for chain in &self.chains {
            if !seen.insert(chain.name.as_str()) {
                return Err(ReadError::Config(format!("duplicate chain '{}'", chain.name)));
            }
            if chain.rpc.is_empty() {
                return Err(ReadError::NoEndpoints {
                    chain: chain.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ChainDescriptor> {
        self.chains.iter().find(|c| c.name == name)
    }
}
