//! # Fabric Wallet Bridge CLI
//!
//! ウォレット（EIP-1193互換のJSON-RPC）で署名したアクセストークンを使い、
//! Content Fabricのオブジェクト情報取得・作成・アップロードを行う。

mod config;
mod context;
mod flow;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use fabric_client::load_files;

use crate::config::AppConfig;
use crate::context::AppContext;

#[derive(Parser)]
#[command(name = "fabric-cli")]
#[command(about = "Wallet-signed access tokens for the Eluvio Content Fabric", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    config: AppConfig,
}

#[derive(Subcommand)]
enum Command {
    /// Request account access from the wallet
    Connect,
    /// List connected accounts
    Accounts,
    /// Show chain, network, accounts and EIP-1559 support
    Status,
    /// Add the local development chain to the wallet
    AddChain,
    /// Switch the wallet to a chain (default: local development chain)
    SwitchChain {
        #[arg(long)]
        chain_id: Option<String>,
    },
    /// Watch wallet state and print change events until Ctrl-C
    Watch {
        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Create an edit-request token for an object (sends updateRequest)
    EditToken {
        /// Object ID (default: configured object)
        #[arg(long)]
        object: Option<String>,
    },
    /// Create a client-signed token
    SignedToken,
    /// Decode a token and verify its signer
    DecodeToken { token: String },
    /// Show the latest hash, type and metadata of an object
    Info {
        /// Object ID (default: configured object)
        #[arg(long)]
        object: Option<String>,
    },
    /// Create a new object in the configured library and upload files
    Ingest {
        /// Directory containing the files
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        files: Vec<String>,
    },
    /// Edit token for the configured object, then ingest files
    Attach {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        files: Vec<String>,
    },
}

impl Command {
    /// Fabricのネットワーク設定が必要か。
    fn needs_fabric(&self) -> bool {
        matches!(
            self,
            Command::EditToken { .. }
                | Command::SignedToken
                | Command::Info { .. }
                | Command::Ingest { .. }
                | Command::Attach { .. }
        )
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let http_client = reqwest::Client::new();
    let ctx = if cli.command.needs_fabric() {
        AppContext::connect(cli.config, http_client).await?
    } else {
        AppContext::wallet_only(cli.config, http_client)
    };

    match cli.command {
        Command::Connect => {
            for account in flow::connect(&ctx).await? {
                println!("{account}");
            }
        }
        Command::Accounts => {
            let accounts = flow::accounts(&ctx).await?;
            if accounts.is_empty() {
                println!("(not connected)");
            }
            for account in accounts {
                println!("{account}");
            }
        }
        Command::Status => {
            let status = flow::status(&ctx).await?;
            println!("chainId: {}", status.chain_id);
            println!("networkId: {}", status.network);
            println!("accounts: {}", status.accounts.join(", "));
            println!("eip1559: {}", status.eip1559);
            if status.mainnet {
                println!("WARNING: connected to Ethereum mainnet");
            }
        }
        Command::AddChain => {
            flow::add_chain(&ctx).await?;
            println!("added");
        }
        Command::SwitchChain { chain_id } => {
            let chain_id = flow::switch_chain(&ctx, chain_id.as_deref()).await?;
            println!("switched to {chain_id}");
        }
        Command::Watch { interval_ms } => {
            flow::watch(&ctx, Duration::from_millis(interval_ms.max(1))).await?;
        }
        Command::EditToken { object } => {
            let address = flow::current_address(&ctx).await?;
            let object_id = object.unwrap_or_else(|| ctx.config.object_id.clone());
            println!("{}", flow::create_edit_token(&ctx, &address, &object_id).await?);
        }
        Command::SignedToken => {
            let address = flow::current_address(&ctx).await?;
            let duration = ctx.config.token_duration();
            println!(
                "{}",
                flow::create_client_signed_token(&ctx, &address, duration).await?
            );
        }
        Command::DecodeToken { token } => {
            let decoded = fabric_token::decode_token(&token)?;
            let mut summary = decoded.summary();
            summary["signer"] = match decoded.verify() {
                Ok(address) => serde_json::json!(address),
                Err(e) => serde_json::json!(format!("unverified: {e}")),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Info { object } => {
            let object_id = object.unwrap_or_else(|| ctx.config.object_id.clone());
            let info = flow::object_info(&ctx, &ctx.config.library_id, &object_id).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Ingest { dir, files } => {
            let files = load_files(&dir, &files).await?;
            let address = flow::current_address(&ctx).await?;
            let result =
                flow::ingest(&ctx, &address, &files, Some(flow::logging_progress())).await?;
            println!("objectId: {}", result.object_id);
            println!("writeToken: {}", result.write_token);
        }
        Command::Attach { dir, files } => {
            let files = load_files(&dir, &files).await?;
            let summary = flow::attach(&ctx, &files, Some(flow::logging_progress())).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
