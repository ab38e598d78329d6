//! tezos-operator
//!
//! Prepares, estimates, signs and injects Tezos operations for a single
//! ed25519 account.
//!
//! # Architecture Overview
//!
//! ```text
//!   requests.json ──▶ ┌──────────────────────────────────────────────┐
//!                     │               OperationPipeline              │
//!                     │                                              │
//!                     │  context ─▶ normalizer ─▶ estimator ─▶ forge │
//!                     │                                    │         │
//!                     │                       wallet (sign)◀┘        │
//!                     │                            │                 │
//!                     │                        broadcast             │
//!                     └────────────────────────────┼─────────────────┘
//!                                                  ▼
//!                                           Tezos node RPC
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use tezos_operator::blockchain::{NodeClient, OperationPipeline, OperationRequest, TezosRpc, Wallet};
use tezos_operator::config::loader::{load_or_default, save_config};
use tezos_operator::config::schema::{Network, DEFAULT_NODE_URL};
use tezos_operator::config::{OperatorConfig, RpcConfig};
use tezos_operator::observability::init_logging;

#[derive(Parser)]
#[command(name = "tezos-operator")]
#[command(about = "Prepare, sign and inject Tezos operations", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "tezos-operator.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the wallet's public key and address
    Account,
    /// Query the balance of an address
    Balance { address: String },
    /// Forge and sign operations from a JSON file without injecting
    Prepare {
        file: PathBuf,
        /// Keep caller-supplied limits and fees
        #[arg(long)]
        keep_parameters: bool,
    },
    /// Forge, sign and inject operations from a JSON file
    Send {
        file: PathBuf,
        #[arg(long)]
        keep_parameters: bool,
    },
    /// Sign arbitrary hex bytes
    SignPayload { payload: String },
    /// Manage the node endpoint
    Rpc {
        #[command(subcommand)]
        command: RpcCommands,
    },
}

#[derive(Subcommand)]
enum RpcCommands {
    /// Print the configured node
    Get,
    /// Verify and store a node URL
    Set {
        url: String,
        #[arg(short, long, default_value = "custom")]
        network: Network,
    },
    /// Restore the default node
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_or_default(&cli.config)?;
    init_logging(&config.observability);

    tracing::debug!(
        config = %cli.config.display(),
        network = %config.rpc.network,
        node_url = %config.rpc.node_url,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Account => {
            let wallet = load_wallet(&config)?;
            print_json(&wallet.account())?;
        }
        Commands::Balance { address } => {
            let client = NodeClient::new(&config.rpc)?;
            let balance = client.get_balance(&address).await?;
            print_json(&json!({ "address": address, "balance": balance.to_string() }))?;
        }
        Commands::Prepare { file, keep_parameters } => {
            let requests = read_requests(&file)?;
            let wallet = load_wallet(&config)?;
            let client = NodeClient::new(&config.rpc)?;
            let mut pipeline = OperationPipeline::new(&client, &client, &wallet);
            if keep_parameters {
                pipeline = pipeline.keep_caller_parameters();
            }
            print_json(&pipeline.prepare_and_sign(requests).await?)?;
        }
        Commands::Send { file, keep_parameters } => {
            let requests = read_requests(&file)?;
            let wallet = load_wallet(&config)?;
            let client = NodeClient::new(&config.rpc)?;
            let mut pipeline = OperationPipeline::new(&client, &client, &wallet);
            if keep_parameters {
                pipeline = pipeline.keep_caller_parameters();
            }
            let op_hash = pipeline.send(requests).await?;
            print_json(&json!({ "opHash": op_hash }))?;
        }
        Commands::SignPayload { payload } => {
            let wallet = load_wallet(&config)?;
            print_json(&wallet.sign(&payload, None)?)?;
        }
        Commands::Rpc { command } => match command {
            RpcCommands::Get => print_rpc(&config.rpc)?,
            RpcCommands::Set { url, network } => {
                let timeout = Duration::from_secs(config.rpc.timeout_secs);
                let (node_url, _header) = NodeClient::check_node(&url, timeout).await?;
                config.rpc.network = network;
                config.rpc.node_url = node_url;
                save_config(&cli.config, &config)?;
                print_rpc(&config.rpc)?;
            }
            RpcCommands::Clear => {
                config.rpc.network = Network::Mainnet;
                config.rpc.node_url = DEFAULT_NODE_URL.to_string();
                save_config(&cli.config, &config)?;
                print_rpc(&config.rpc)?;
            }
        },
    }

    Ok(())
}

fn load_wallet(config: &OperatorConfig) -> Result<Wallet, Box<dyn std::error::Error>> {
    Ok(Wallet::from_env(&config.wallet.private_key_env)?)
}

/// Requests are a JSON array, or a single request object.
fn read_requests(path: &Path) -> Result<Vec<OperationRequest>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let requests = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(OperationRequest::from_value)
            .collect::<Result<Vec<_>, _>>()?,
        single => vec![OperationRequest::from_value(single)?],
    };
    Ok(requests)
}

fn print_rpc(rpc: &RpcConfig) -> Result<(), Box<dyn std::error::Error>> {
    print_json(&json!({ "network": rpc.network, "nodeUrl": rpc.node_url }))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
