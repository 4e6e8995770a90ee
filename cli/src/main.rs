//! chainread CLI — failover reads against one or more EVM chains.
//!
//! Usage:
//! ```bash
//! # Latest block, trying each configured endpoint in order
//! chainread head --chain avalanche
//!
//! # Block closest to a point in time
//! chainread block-at --chain polygon --timestamp 2024-03-20T00:00:00Z
//!
//! # Blocks produced over the last 24 hours
//! chainread daily-blocks --chain bsc
//!
//! # Contract read with an ABI file
//! chainread call --chain avalanche --address 0xc719... --abi erc20.json \
//!     --method balanceOf --arg 0x078d...
//! ```

mod logging;

use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;

use alloy_dyn_abi::{DynSolValue, Specifier};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use chainread_core::{
    AbiRegistry, Block, BlockTag, ChainsConfig, LogFilter, ProviderRegistry, ProviderSet,
    ReadContext,
};
use chainread_http::{provider_registry, HttpClientConfig};
use chainread_providers::public;

use crate::logging::{init_tracing, LogConfig};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }
    let rest = &args[2..];

    init_tracing(&LogConfig {
        level: parse_flag(rest, "--log").unwrap_or_else(|| LogConfig::default().level),
        json: has_flag(rest, "--json-logs"),
    });
    tracing::debug!(command = %args[1], "chainread starting");

    let result = match args[1].as_str() {
        "chains" => cmd_chains(rest),
        "head" => cmd_head(rest).await,
        "block" => cmd_block(rest).await,
        "block-at" => cmd_block_at(rest).await,
        "daily-blocks" => cmd_daily_blocks(rest).await,
        "logs" => cmd_logs(rest).await,
        "call" => cmd_call(rest).await,
        "version" | "--version" | "-V" => {
            println!("chainread {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainread {}", env!("CARGO_PKG_VERSION"));
    println!("Failover reads across redundant EVM RPC endpoints\n");
    println!("USAGE:");
    println!("    chainread <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    chains        List configured chains and their endpoints");
    println!("    head          Latest block number");
    println!("    block         Block by number (--number)");
    println!("    block-at      Block closest to a time (--timestamp <unix|RFC3339>)");
    println!("    daily-blocks  Blocks produced in the last 24 hours");
    println!("    logs          Event logs (--address, --topic0, --from, --to, --receipts)");
    println!("    call          Contract read (--address, --abi <file>, --method, --arg ...)");
    println!("    version       Print version");
    println!("    help          Print this help\n");
    println!("GLOBAL FLAGS:");
    println!("    --config <PATH>   Chains config JSON (default: built-in public endpoints)");
    println!("    --chain <NAME>    Chain to read from");
    println!("    --timeout <SECS>  Per-request timeout (default: 30)");
    println!("    --log <FILTER>    Log filter, e.g. debug or chainread_core=debug (RUST_LOG wins)");
    println!("    --json-logs       Emit logs as JSON");
}

// ─── Setup ────────────────────────────────────────────────────────────────────

fn load_chains(args: &[String]) -> Result<ChainsConfig> {
    match parse_flag(args, "--config") {
        Some(path) => ChainsConfig::from_file(Path::new(&path))
            .with_context(|| format!("loading chains config {path}")),
        None => Ok(public::all()),
    }
}

fn load_registry(args: &[String]) -> Result<ProviderRegistry> {
    let chains = load_chains(args)?;
    let mut http = HttpClientConfig::default();
    if let Some(secs) = parse_flag(args, "--timeout") {
        http.request_timeout_secs = secs.parse().context("--timeout must be whole seconds")?;
    }
    Ok(provider_registry(&chains, &http)?)
}

fn selected_chain(args: &[String], registry: &ProviderRegistry) -> Result<Arc<ProviderSet>> {
    let name = parse_flag(args, "--chain").ok_or_else(|| anyhow!("--chain is required"))?;
    Ok(registry.require(&name)?)
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn cmd_chains(args: &[String]) -> Result<()> {
    let chains = load_chains(args)?;
    for chain in &chains.chains {
        println!("{} (chain id {})", chain.name, chain.chain_id);
        for (i, url) in chain.rpc.iter().enumerate() {
            println!("  {}. {url}", i + 1);
        }
    }
    Ok(())
}

async fn cmd_head(args: &[String]) -> Result<()> {
    let registry = load_registry(args)?;
    let set = selected_chain(args, &registry)?;
    println!("{}", set.get_block_number().await?);
    Ok(())
}

async fn cmd_block(args: &[String]) -> Result<()> {
    let registry = load_registry(args)?;
    let set = selected_chain(args, &registry)?;
    let number: u64 = parse_flag(args, "--number")
        .ok_or_else(|| anyhow!("--number is required"))?
        .parse()
        .context("--number must be a block number")?;
    print_block(&set.get_block(number).await?);
    Ok(())
}

async fn cmd_block_at(args: &[String]) -> Result<()> {
    let registry = load_registry(args)?;
    let set = selected_chain(args, &registry)?;
    let raw = parse_flag(args, "--timestamp").ok_or_else(|| anyhow!("--timestamp is required"))?;
    let target = parse_timestamp(&raw)?;
    print_block(&set.block_at_timestamp(target).await?);
    Ok(())
}

async fn cmd_daily_blocks(args: &[String]) -> Result<()> {
    let registry = load_registry(args)?;
    let set = selected_chain(args, &registry)?;
    println!("{}", set.blocks_in_last_24_hours().await?);
    Ok(())
}

async fn cmd_logs(args: &[String]) -> Result<()> {
    let registry = load_registry(args)?;
    let set = selected_chain(args, &registry)?;

    let mut filter = LogFilter {
        address: parse_flag(args, "--address"),
        ..Default::default()
    };
    if let Some(topic0) = parse_flag(args, "--topic0") {
        filter = filter.topic(Some(topic0));
    }
    if let Some(from) = parse_flag(args, "--from") {
        filter = filter.from_block(parse_block_tag(&from)?);
    }
    if let Some(to) = parse_flag(args, "--to") {
        filter = filter.to_block(parse_block_tag(&to)?);
    }

    let logs = set.get_logs(&filter).await?;
    println!("{}", serde_json::to_string_pretty(&logs)?);

    if has_flag(args, "--receipts") {
        let receipts = set.receipts_for_logs(&logs).await?;
        println!("{}", serde_json::to_string_pretty(&receipts)?);
    }
    Ok(())
}

async fn cmd_call(args: &[String]) -> Result<()> {
    let chain = parse_flag(args, "--chain").ok_or_else(|| anyhow!("--chain is required"))?;
    let address = parse_flag(args, "--address").ok_or_else(|| anyhow!("--address is required"))?;
    let abi_path = parse_flag(args, "--abi").ok_or_else(|| anyhow!("--abi is required"))?;
    let method = parse_flag(args, "--method").ok_or_else(|| anyhow!("--method is required"))?;
    let raw_args = parse_multi(args, "--arg");

    let abi_json = std::fs::read_to_string(&abi_path)
        .with_context(|| format!("reading ABI {abi_path}"))?;
    let mut abis = AbiRegistry::new();
    abis.add_json(abi_path.clone(), &abi_json)?;
    let ctx = ReadContext::new(load_registry(args)?, abis);
    let (set, abi) = ctx.resolve(&chain, &abi_path)?;

    let function = abi
        .function(&method)
        .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == raw_args.len()))
        .ok_or_else(|| anyhow!("no '{method}' taking {} arguments in {abi_path}", raw_args.len()))?;
    let values = function
        .inputs
        .iter()
        .zip(&raw_args)
        .map(|(param, raw)| {
            let ty = param
                .resolve()
                .with_context(|| format!("parameter '{}'", param.name))?;
            ty.coerce_str(raw)
                .with_context(|| format!("parameter '{}' as {ty}", param.name))
        })
        .collect::<Result<Vec<_>>>()?;

    let outputs = set.read_contract(&address, &abi, &method, &values).await?;
    for value in &outputs {
        println!("{}", format_value(value));
    }
    Ok(())
}

// ─── Formatting ───────────────────────────────────────────────────────────────

fn print_block(block: &Block) {
    let time = i64::try_from(block.timestamp)
        .ok()
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    println!("  Number:    {}", block.number);
    println!("  Hash:      {}", block.hash);
    println!("  Timestamp: {} ({time})", block.timestamp);
}

fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Address(a) => a.to_string(),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            format!("[{}]", items.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        DynSolValue::Tuple(items) => {
            format!("({})", items.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        other => format!("{other:?}"),
    }
}

// ─── Argument parsing ─────────────────────────────────────────────────────────

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

fn parse_multi(args: &[String], flag: &str) -> Vec<String> {
    args.windows(2)
        .filter(|w| w[0] == flag)
        .map(|w| w[1].clone())
        .collect()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Unix seconds or an RFC 3339 date-time.
fn parse_timestamp(raw: &str) -> Result<u64> {
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(secs);
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("'{raw}' is neither unix seconds nor RFC 3339"))?;
    u64::try_from(parsed.timestamp()).context("timestamp before 1970")
}

fn parse_block_tag(raw: &str) -> Result<BlockTag> {
    Ok(match raw {
        "latest" => BlockTag::Latest,
        "earliest" => BlockTag::Earliest,
        "pending" => BlockTag::Pending,
        n => BlockTag::Number(n.parse().with_context(|| format!("bad block '{n}'"))?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_dyn_abi::DynSolType;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn flags_and_repeated_args() {
        let a = args("--chain bsc --arg 1 --arg 0xabc --json-logs");
        assert_eq!(parse_flag(&a, "--chain").as_deref(), Some("bsc"));
        assert_eq!(parse_multi(&a, "--arg"), vec!["1", "0xabc"]);
        assert!(has_flag(&a, "--json-logs"));
        assert!(parse_flag(&a, "--config").is_none());
    }

    #[test]
    fn timestamps() {
        assert_eq!(parse_timestamp("1700000000").unwrap(), 1_700_000_000);
        assert_eq!(parse_timestamp("1970-01-02T00:00:00Z").unwrap(), 86_400);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn block_tags() {
        assert_eq!(parse_block_tag("latest").unwrap(), BlockTag::Latest);
        assert_eq!(parse_block_tag("42").unwrap(), BlockTag::Number(42));
        assert!(parse_block_tag("0x2a").is_err());
    }

    #[test]
    fn format_nested_values() {
        let value = DynSolType::Tuple(vec![DynSolType::Bool, DynSolType::Uint(256)])
            .coerce_str("(true, 42)")
            .unwrap();
        assert_eq!(format_value(&value), "(true, 42)");
    }

    #[test]
    fn default_config_is_public_presets() {
        let chains = load_chains(&[]).unwrap();
        assert!(chains.get("ethereum").is_some());
    }
}
