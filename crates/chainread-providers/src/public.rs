//! Public / community RPC endpoints.
//!
//! Free, no-API-key endpoints suitable for development and light reads.
//! Each chain lists several providers so failover has somewhere to go.

use chainread_core::{ChainDescriptor, ChainsConfig};

/// `(name, chain_id, endpoints in priority order)`.
const PUBLIC_CHAINS: &[(&str, u64, &[&str])] = &[
    (
        "ethereum",
        1,
        &[
            "https://eth.llamarpc.com",
            "https://rpc.ankr.com/eth",
            "https://ethereum-rpc.publicnode.com",
            "https://cloudflare-eth.com",
        ],
    ),
    (
        "optimism",
        10,
        &[
            "https://mainnet.optimism.io",
            "https://rpc.ankr.com/optimism",
            "https://optimism-rpc.publicnode.com",
        ],
    ),
    (
        "bsc",
        56,
        &[
            "https://bsc-dataseed.binance.org",
            "https://rpc.ankr.com/bsc",
            "https://bsc-rpc.publicnode.com",
        ],
    ),
    (
        "polygon",
        137,
        &[
            "https://polygon-rpc.com",
            "https://polygon.llamarpc.com",
            "https://rpc.ankr.com/polygon",
        ],
    ),
    (
        "base",
        8453,
        &[
            "https://mainnet.base.org",
            "https://rpc.ankr.com/base",
            "https://base-rpc.publicnode.com",
        ],
    ),
    (
        "arbitrum",
        42161,
        &[
            "https://arb1.arbitrum.io/rpc",
            "https://rpc.ankr.com/arbitrum",
            "https://arbitrum-one-rpc.publicnode.com",
        ],
    ),
    (
        "avalanche",
        43114,
        &[
            "https://api.avax.network/ext/bc/C/rpc",
            "https://rpc.ankr.com/avalanche",
            "https://avalanche-c-chain-rpc.publicnode.com",
        ],
    ),
];

fn to_descriptor((name, chain_id, rpc): &(&str, u64, &[&str])) -> ChainDescriptor {
    ChainDescriptor::new(*name, rpc.iter().map(|u| u.to_string()).collect(), *chain_id)
}

/// Public endpoints for the chain called `name`.
pub fn chain(name: &str) -> Option<ChainDescriptor> {
    PUBLIC_CHAINS
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(to_descriptor)
}

/// Public endpoints for `chain_id`.
pub fn chain_by_id(chain_id: u64) -> Option<ChainDescriptor> {
    PUBLIC_CHAINS
        .iter()
        .find(|(_, id, _)| *id == chain_id)
        .map(to_descriptor)
}

/// Every built-in chain.
pub fn all() -> ChainsConfig {
    ChainsConfig {
        chains: PUBLIC_CHAINS.iter().map(to_descriptor).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avalanche_by_name() {
        let avax = chain("Avalanche").unwrap();
        assert_eq!(avax.chain_id, 43114);
        assert_eq!(avax.rpc[0], "https://api.avax.network/ext/bc/C/rpc");
    }

    #[test]
    fn polygon_by_id() {
        assert_eq!(chain_by_id(137).unwrap().name, "polygon");
        assert!(chain_by_id(999_999).is_none());
    }

    #[test]
    fn built_ins_are_valid_config() {
        let config = all();
        config.validate().unwrap();
        assert!(config.chains.iter().all(|c| c.rpc.len() >= 2));
    }
}
