//! unimove: run chain-agnostic operations from the command line.
//!
//! ```bash
//! # Fullnode URL of the ambient chain (UNIMOVE_DEFAULT_CHAIN, default sui)
//! unimove url testnet
//!
//! # Same command, other chain
//! unimove --chain iota url testnet
//!
//! # Parse and normalize a struct tag
//! unimove parse-tag '0x2::coin::Coin<0x2::sui::SUI>'
//!
//! # Any registered operation, JSON arguments
//! unimove --chain iota call get_network '"devnet"'
//! ```
//!
//! Every command prints JSON on stdout. Logs go to stderr, filtered by
//! `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use unimove::chains::ClientNamespace;
use unimove::{registry, Chain, ChainId, Dispatcher, Iota};

#[derive(Parser)]
#[command(
    name = "unimove",
    author,
    version,
    about = "Chain-agnostic Sui / IOTA toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Chain to run on (sui, iota). Defaults to the ambient chain.
    #[arg(long, global = true, value_parser = ChainId::parse_lenient)]
    chain: Option<ChainId>,

    /// Compact JSON instead of pretty-printed.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the JSON-RPC fullnode URL.
    Url {
        #[arg(default_value = "mainnet")]
        network: String,
    },
    /// Parse and normalize a Move struct tag.
    ParseTag { tag: String },
    /// Generate a keypair.
    Keygen {
        /// ed25519, secp256k1 or secp256r1.
        #[arg(long, default_value = "ed25519")]
        scheme: String,
    },
    /// Decode a bech32 private key.
    DecodeKey { secret_key: String },
    /// IOTA network discovery table.
    Networks,
    /// List chains with their modules and operations.
    Chains,
    /// Run any registered operation.
    Call {
        operation: String,
        /// Arguments, each parsed as JSON or else taken as a string.
        args: Vec<String>,
    },
    /// Send a raw JSON-RPC request.
    Rpc {
        method: String,
        /// JSON array of params.
        #[arg(default_value = "[]")]
        params: String,
        /// Network name or fullnode URL.
        #[arg(long, default_value = "mainnet")]
        network: String,
    },
}

fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn describe_chains() -> Value {
    let chains: Vec<Value> = registry()
        .bundles()
        .map(|bundle| {
            let modules: serde_json::Map<String, Value> = bundle
                .module_names()
                .map(|name| (name.to_string(), json!(bundle.module(name).is_present())))
                .collect();
            json!({
                "chain": bundle.chain(),
                "available": bundle.is_available(),
                "modules": modules,
                "operations": bundle.operation_names().collect::<Vec<_>>(),
            })
        })
        .collect();
    json!(chains)
}

async fn run(
    dispatcher: &Dispatcher,
    chain: Option<ChainId>,
    operation: &str,
    args: Vec<Value>,
) -> Result<Value> {
    let state = dispatcher.dispatch(operation, chain, args)?.await;
    tracing::debug!(chain = %state.chain, operation, ok = state.is_success(), "operation finished");
    state
        .into_result()
        .with_context(|| format!("{} failed", operation))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        command,
        chain,
        compact,
    } = Cli::parse();
    let dispatcher = Dispatcher::new();

    let output = match command {
        Commands::Url { network } => {
            run(&dispatcher, chain, "get_fullnode_url", vec![json!(network)]).await?
        }
        Commands::ParseTag { tag } => {
            run(&dispatcher, chain, "normalize_struct_tag", vec![json!(tag)]).await?
        }
        Commands::Keygen { scheme } => {
            run(&dispatcher, chain, "generate_keypair", vec![json!(scheme)]).await?
        }
        Commands::DecodeKey { secret_key } => {
            run(&dispatcher, chain, "decode_private_key", vec![json!(secret_key)]).await?
        }
        Commands::Networks => json!(Iota::modules().client.network_tools().get_all_networks()),
        Commands::Chains => describe_chains(),
        Commands::Call { operation, args } => {
            let args = args.iter().map(|raw| parse_arg(raw)).collect();
            run(&dispatcher, chain, &operation, args).await?
        }
        Commands::Rpc {
            method,
            params,
            network,
        } => {
            let params: Value =
                serde_json::from_str(&params).context("params must be a JSON array")?;
            run(
                &dispatcher,
                chain,
                "client_query",
                vec![json!(method), params, json!(network)],
            )
            .await?
        }
    };

    let rendered = if compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", rendered);
    Ok(())
}
