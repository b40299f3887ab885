//! palm-minter command line.
//!
//! Stands in for the browser UI: every subcommand maps to one of the
//! presentation-layer entry points and prints its result as JSON.

use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use serde::Serialize;

use palm_minter::chain::{ActiveChain, ChainObservation};
use palm_minter::config::{load_or_default, AppConfig};
use palm_minter::lifecycle::signals::wait_for_shutdown_signal;
use palm_minter::lifecycle::Shutdown;
use palm_minter::network::known_chains;
use palm_minter::network::registry::chain_label;
use palm_minter::observability::{logging, metrics};
use palm_minter::wallet::SigningIdentity;
use palm_minter::Dapp;

#[derive(Parser)]
#[command(name = "palm-minter")]
#[command(about = "Connect a wallet, onboard it onto PALM and call the minting contract", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the networks this client knows
    Chains,
    /// Request account access from the wallet
    Connect,
    /// Detect the wallet's active chain
    Chain,
    /// Register the onboarding chain with the wallet
    AddChain,
    /// Register the onboarding chain only if the wallet is elsewhere
    Reconcile,
    /// Mint a token into the vault
    Mint {
        /// Content locator, e.g. ipfs://{hash}
        token_uri: String,
        /// Allow the token to be redeemed later
        #[arg(long)]
        redeemable: bool,
    },
    /// Set the vault address (administrator only)
    SetVault {
        #[arg(value_parser = parse_address)]
        address: Address,
    },
    /// Mark a token as redeemed (irreversible)
    Redeem {
        #[arg(value_parser = parse_token_id)]
        token_id: U256,
    },
    /// Follow chain and account changes until interrupted
    Watch {
        /// Request account access first so account switches are followed
        #[arg(long)]
        connect: bool,
    },
}

fn parse_address(value: &str) -> Result<Address, String> {
    value
        .parse::<Address>()
        .map_err(|e| format!("invalid address '{}': {}", value, e))
}

fn parse_token_id(value: &str) -> Result<U256, String> {
    value
        .parse::<U256>()
        .map_err(|e| format!("invalid token id '{}': {}", value, e))
}

#[derive(Serialize)]
struct ChainReport {
    chain_id: u64,
    label: Option<&'static str>,
}

impl ChainReport {
    fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            label: chain_label(chain_id),
        }
    }
}

/// One line of `watch` output.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WatchReport {
    Chain(ChainObservation),
    Identity(SigningIdentity),
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    logging::init_logging(&config.observability);
    tracing::debug!(command_config = ?cli.config, "palm-minter starting");

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let dapp = Dapp::from_config(config)?;

    match command {
        Commands::Chains => {
            for chain in known_chains() {
                println!("{} - {}", chain.label, chain.chain_id);
            }
        }
        Commands::Connect => {
            let identity = dapp.connect().await?;
            print_json(&identity)?;
        }
        Commands::Chain => {
            let chain_id = dapp.detect_chain().await?;
            print_json(&ChainReport::new(chain_id))?;
        }
        Commands::AddChain => {
            let chain_id = dapp.add_onboarding_chain().await?;
            print_json(&ChainReport::new(chain_id))?;
        }
        Commands::Reconcile => {
            let status = dapp.reconcile().await?;
            print_json(&status)?;
        }
        Commands::Mint {
            token_uri,
            redeemable,
        } => {
            dapp.connect().await?;
            let handle = dapp.contract().mint(&token_uri, redeemable).await?;
            print_json(&handle)?;
        }
        Commands::SetVault { address } => {
            dapp.connect().await?;
            let handle = dapp.contract().set_vault_address(address).await?;
            print_json(&handle)?;
        }
        Commands::Redeem { token_id } => {
            dapp.connect().await?;
            let handle = dapp.contract().set_redemption(token_id).await?;
            print_json(&handle)?;
        }
        Commands::Watch { connect } => watch(&dapp, config, connect).await?,
    }

    Ok(())
}

async fn watch(
    dapp: &Dapp,
    config: &AppConfig,
    connect: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let mut shutdown = Shutdown::new();
    dapp.spawn_listeners(&mut shutdown).await?;

    let mut chains = dapp.monitor().watch();
    let mut identities = dapp.session().watch();

    match dapp.detect_chain().await {
        Ok(chain_id) => print_json(&ChainReport::new(chain_id))?,
        Err(e) => tracing::warn!(error = %e, "Initial chain detection failed"),
    }
    chains.borrow_and_update();

    if connect {
        if let Err(e) = dapp.connect().await {
            tracing::warn!(error = %e, "Connection request failed");
        }
    }

    tracing::info!(listeners = shutdown.task_count(), "Watching wallet, press Ctrl-C to stop");

    let stop = wait_for_shutdown_signal();
    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = &mut stop => break,
            changed = chains.changed() => {
                if changed.is_err() {
                    break;
                }
                let active = *chains.borrow_and_update();
                if let ActiveChain::Known(observation) = active {
                    print_json(&WatchReport::Chain(observation))?;
                }
            }
            changed = identities.changed() => {
                if changed.is_err() {
                    break;
                }
                let identity = *identities.borrow_and_update();
                print_json(&WatchReport::Identity(identity))?;
            }
        }
    }

    shutdown.drain(Duration::from_secs(2)).await;
    Ok(())
}
