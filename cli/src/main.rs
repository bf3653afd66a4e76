//! txlens CLI: decode event logs, normalize transaction receipts, encode and
//! run contract calls.
//!
//! # Commands
//! ```text
//! txlens decode-events --input <file|-> [--abi <path.json>]
//! txlens decode-log    --topics <...> --data <hex> [--address <addr>] [--abi <path.json>]
//! txlens receipt       <txHash> [--abi <path.json>]
//! txlens topic         <signature>
//! txlens selector      <signature>
//! txlens encode-call   --abi <path.json> --function <name> --args <...>
//! txlens call          --address <addr> --abi <path.json> --function <name> --args <...>
//! txlens abi           --abi <path.json>
//! ```
//!
//! Results go to stdout as JSON (hex for `topic`, `selector`, `encode-call`);
//! logs go to stderr. A receipt that does not exist yet exits with code 2.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use txlens_core::Network;
use txlens_receipt::ReceiptError;
use txlens_rpc::RpcError;

mod cmd_abi;
mod cmd_call;
mod cmd_decode;
mod cmd_receipt;
mod config;

use config::AppConfig;

/// Exit code for "the node does not know this transaction (yet)".
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(
    name = "txlens",
    about = "EVM transaction and event decoder for Rootstock nodes",
    long_about = "
txlens: decode EVM event logs, normalize transaction receipts, encode calldata
and run read-only contract calls. Defaults to the Rootstock public nodes.

ENVIRONMENT VARIABLES:
  TXLENS_RPC_MAINNET       Mainnet JSON-RPC URL
  TXLENS_RPC_TESTNET       Testnet JSON-RPC URL
  TXLENS_RPC_TIMEOUT_MS    Per-call timeout in milliseconds
  RUST_LOG                 Log filter, overrides the configured level
",
    version
)]
struct Cli {
    /// YAML config file with `rpc` and `log` sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Network for RPC-backed commands: mainnet | testnet
    #[arg(long, global = true, default_value = "mainnet")]
    network: Network,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a batch of logs: `{ "events": [...], "abi": [...] }`
    #[command(name = "decode-events")]
    DecodeEvents {
        /// Request file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Extra ABI whose events are registered for this request
        #[arg(long)]
        abi: Option<PathBuf>,
    },

    /// Decode one log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        /// topics[0] = event signature hash, topics[1..] = indexed params
        #[arg(long, num_args = 0..)]
        topics: Vec<String>,
        /// Non-indexed params (hex)
        #[arg(long, default_value = "0x")]
        data: String,
        /// Emitting contract
        #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
        address: String,
        #[arg(long)]
        abi: Option<PathBuf>,
    },

    /// Fetch a transaction receipt and decode its events
    Receipt {
        /// 0x-prefixed 32-byte transaction hash
        tx_hash: String,
        #[arg(long)]
        abi: Option<PathBuf>,
    },

    /// keccak256 topic hash of an event signature
    Topic {
        /// e.g. `Transfer(address,address,uint256)`
        signature: String,
    },

    /// 4-byte selector of a function signature
    Selector {
        /// e.g. `transfer(address,uint256)`
        signature: String,
    },

    /// ABI-encode calldata for a function
    #[command(name = "encode-call")]
    EncodeCall {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        function: String,
        /// One value per input; arrays and tuples as JSON
        #[arg(long, num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a view/pure function with eth_call and decode its outputs
    Call {
        #[arg(long)]
        address: String,
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        function: String,
        #[arg(long, num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List the functions (read/write) and events of an ABI
    Abi {
        #[arg(long)]
        abi: PathBuf,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        config.log.level = "debug".into();
    }
    if cli.json_logs {
        config.log.json = true;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    txlens_observability::init_tracing(&config.log);
    let network = cli.network;

    match cli.command {
        Commands::DecodeEvents { input, abi } => cmd_decode::decode_events(&input, abi.as_deref()),

        Commands::DecodeLog { topics, data, address, abi } => {
            cmd_decode::decode_log(&topics, &data, &address, abi.as_deref())
        }

        Commands::Receipt { tx_hash, abi } => {
            cmd_receipt::run(&config, &tx_hash, network, abi.as_deref()).await
        }

        Commands::Topic { signature } => {
            println!("{}", cmd_abi::topic(&signature)?);
            Ok(())
        }

        Commands::Selector { signature } => {
            println!("{}", cmd_abi::selector(&signature)?);
            Ok(())
        }

        Commands::EncodeCall { abi, function, args } => cmd_call::encode(&abi, &function, &args),

        Commands::Call { address, abi, function, args } => {
            cmd_call::call(&config, &address, &abi, &function, &args, network).await
        }

        Commands::Abi { abi } => cmd_abi::run(&abi),
    }
}

/// Not-found outcomes are expected answers, not failures of txlens.
fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ReceiptError>().is_some_and(ReceiptError::is_not_found)
        || err.downcast_ref::<RpcError>().is_some_and(RpcError::is_not_found)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_not_found(&e) => {
            eprintln!("not found: {e}");
            ExitCode::from(EXIT_NOT_FOUND)
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "txlens",
            "receipt",
            "0x00",
            "--network",
            "testnet",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.network, Network::Testnet);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Receipt { .. }));
    }

    #[test]
    fn unknown_network_is_rejected() {
        assert!(Cli::try_parse_from(["txlens", "--network", "sepolia", "topic", "A()"]).is_err());
    }

    #[test]
    fn negative_args_reach_the_encoder() {
        let cli = Cli::try_parse_from([
            "txlens", "encode-call", "--abi", "a.json", "--function", "f", "--args", "-5", "7",
        ])
        .unwrap();
        match cli.command {
            Commands::EncodeCall { args, .. } => assert_eq!(args, ["-5", "7"]),
            _ => panic!("expected encode-call"),
        }
    }

    #[test]
    fn not_found_detection() {
        let nf: anyhow::Error = ReceiptError::NotYetMined { tx_hash: "0x01".into() }.into();
        assert!(is_not_found(&nf));
        let other = anyhow::anyhow!("boom");
        assert!(!is_not_found(&other));
    }
}
