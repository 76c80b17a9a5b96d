//! Command Line Interface for the gauge dashboard.
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use gauge_data::positions::collection_address;
use gauge_domain::address::{derive_address, normalize, shorten};
use gauge_domain::entities::{PoolKey, PoolMeta};
use gauge_domain::error::DraftField;
use gauge_execution::dashboard::GaugeDashboard;
use gauge_protocols::config::GaugeConfig;
use gauge_protocols::payload::{self, EntryFunctionPayload};
use gauge_protocols::rpc::{RpcConfig, RpcProvider};
use gauge_protocols::store::JsonFileStore;
use gauge_protocols::wallet::{SignerError, TransactionHandle, WalletSigner};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "gauge")]
#[command(about = "Gauge position dashboard CLI", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults to environment variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List gauge pools, pinned first
    Pools {
        /// Account whose positions are shown next to each pool
        #[arg(short, long)]
        account: Option<String>,

        /// JSON file mapping pool addresses to hook type metadata
        #[arg(long)]
        meta: Option<PathBuf>,
    },
    /// List position tokens owned by an account
    Positions {
        /// Owner account
        account: String,

        /// Only show positions of this pool
        #[arg(short, long)]
        pool: Option<String>,
    },
    /// List positions committed to a pool's gauge, with earned rewards
    Committed {
        /// Pool address
        pool: String,
    },
    /// Pin or unpin a pool
    Pin {
        /// Pool address
        pool: String,
    },
    /// Show pinned pools
    Pins,
    /// Validate a bribe and print its payload
    Bribe {
        /// Pool address
        pool: String,

        /// Bribe token address
        #[arg(long, default_value = "")]
        token: String,

        /// Amount in base units
        #[arg(long, default_value = "")]
        amount: String,
    },
    /// Print the payload of a pool action without submitting it
    Payload {
        /// Action to preview
        #[arg(value_enum)]
        action: PayloadAction,

        /// Pool address
        pool: String,

        /// Position token, required for `uncommit`
        #[arg(long)]
        position: Option<String>,
    },
    /// Show the derived position vault and collection addresses
    Collection,
}

#[derive(Clone, Copy, ValueEnum)]
enum PayloadAction {
    Uncommit,
    Swap,
    AddLiquidity,
}

/// Watch-only wallet: exposes an account for reads, refuses to sign.
struct WatchWallet {
    account: Option<String>,
}

#[async_trait]
impl WalletSigner for WatchWallet {
    fn account(&self) -> Option<String> {
        self.account.clone()
    }

    async fn sign_and_submit(
        &self,
        _payload: &EntryFunctionPayload,
    ) -> Result<TransactionHandle, SignerError> {
        Err(SignerError::Rejected("the CLI does not sign transactions".to_string()))
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GaugeConfig> {
    match path {
        Some(path) => GaugeConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(GaugeConfig::from_env()),
    }
}

fn dashboard(config: GaugeConfig, account: Option<String>) -> Result<GaugeDashboard> {
    let provider = RpcProvider::new(RpcConfig {
        node_url: config.node_url.clone(),
        indexer_url: config.indexer_url.clone(),
        ..RpcConfig::default()
    })?;
    let store = JsonFileStore::new(config.pin_file.clone());
    debug!(
        node = %provider.config().node_url,
        pin_file = %store.path().display(),
        "Dashboard backends"
    );

    Ok(GaugeDashboard::new(
        config,
        Arc::new(provider),
        Arc::new(WatchWallet { account }),
        Arc::new(store),
    ))
}

fn load_meta(path: &PathBuf) -> Result<HashMap<PoolKey, PoolMeta>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: HashMap<String, PoolMeta> = serde_json::from_str(&content)?;
    Ok(raw
        .into_iter()
        .map(|(address, meta)| (PoolKey::new(&address), meta))
        .collect())
}

fn print_payload(payload: &EntryFunctionPayload) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match &cli.command {
        Commands::Pools { account, meta } => {
            let metadata = match meta {
                Some(path) => load_meta(path)?,
                None => HashMap::new(),
            };
            let dashboard = dashboard(config, account.clone())?;
            let views = dashboard.pool_views(&metadata).await?;

            println!(
                "{:<3} | {:<15} | {:<6} | {:<9}",
                "", "Pool", "Type", "Positions"
            );
            println!("{}", "-".repeat(42));
            for view in views {
                let marker = if view.pinned { "*" } else { "" };
                let pool = if view.registered {
                    shorten(view.key.as_str())
                } else {
                    format!("{} (gone)", shorten(view.key.as_str()))
                };
                println!(
                    "{:<3} | {:<15} | {:<6} | {:<9}",
                    marker,
                    pool,
                    view.pool_type.to_string(),
                    view.positions.len()
                );
            }
        }
        Commands::Positions { account, pool } => {
            let dashboard = dashboard(config, Some(account.clone()))?;
            let tokens = dashboard.user_positions(account).await?;

            match pool {
                Some(pool) => {
                    let positions = dashboard.reconcile_positions(&tokens, pool);
                    println!("{} position(s) in {}", positions.len(), shorten(pool));
                    for position in positions {
                        println!("  {} index {}", position.token_id, position.index);
                    }
                }
                None => {
                    println!("{} position token(s)", tokens.len());
                    for token in tokens {
                        println!("  {} {}", token.token_data_id, token.encoded_name());
                    }
                }
            }
        }
        Commands::Committed { pool } => {
            let dashboard = dashboard(config, None)?;
            let positions = dashboard.committed_positions(pool).await?;

            println!("{:<68} | {:<7} | {:<20}", "Token", "Index", "Earned");
            println!("{}", "-".repeat(100));
            for position in positions {
                let earned = dashboard.earned(&position).await;
                println!(
                    "{:<68} | {:<7} | {:<20}",
                    position.token_id,
                    position.index.to_string(),
                    earned.to_string()
                );
            }
        }
        Commands::Pin { pool } => {
            let dashboard = dashboard(config, None)?;
            let key = PoolKey::new(&normalize(pool)?);
            if dashboard.toggle(key.clone()).await {
                println!("📌 Pinned {key}");
            } else {
                println!("Unpinned {key}");
            }
        }
        Commands::Pins => {
            let dashboard = dashboard(config, None)?;
            for key in dashboard.pins().await {
                println!("{key}");
            }
        }
        Commands::Bribe {
            pool,
            token,
            amount,
        } => {
            let dashboard = dashboard(config, None)?;
            let voter = dashboard.config().voter()?.to_string();
            dashboard.config().amm()?;
            let key = PoolKey::new(&normalize(pool)?);

            dashboard
                .set_draft_field(key.clone(), DraftField::TokenAddress, token.as_str())
                .await;
            dashboard
                .set_draft_field(key.clone(), DraftField::Amount, amount.as_str())
                .await;
            let bribe = dashboard.validate_draft(&key).await?;

            print_payload(&payload::distribute_bribes(&voter, key.as_str(), &bribe))?;
        }
        Commands::Payload {
            action,
            pool,
            position,
        } => {
            let pool = normalize(pool)?;
            let payload = match action {
                PayloadAction::Uncommit => {
                    let position = position
                        .as_deref()
                        .context("--position is required for uncommit")?;
                    payload::uncommit(config.gauge()?, &pool, position)
                }
                PayloadAction::Swap => {
                    config.voter()?;
                    payload::swap_pool(config.amm()?, &pool)
                }
                PayloadAction::AddLiquidity => {
                    config.voter()?;
                    payload::add_liquidity(config.amm()?, &pool)
                }
            };
            print_payload(&payload)?;
        }
        Commands::Collection => {
            let positions = config.positions()?;
            let vault = derive_address(positions, gauge_data::positions::VAULT_SEED)?;
            println!("Positions account: {positions}");
            println!("Vault:             {vault}");
            println!("Collection:        {}", collection_address(positions)?);
        }
    }

    Ok(())
}
