use std::error::Error as StdError;
use std::path::PathBuf;

use altents::asset_id::DefuseAssetId;
use altents::balance::{format_fixed_point, limit_decimals, parse_units};
use altents::chains::{chain_display_name, chain_filter};
use altents::error::Error;
use altents::{registry_balances, Config, IntentsClient, PollOutcome, TokenRegistry};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fractional digits shown for human-readable amounts.
const DISPLAY_DECIMALS: usize = 6;

type Result<T> = std::result::Result<T, Box<dyn StdError>>;

#[derive(Parser)]
#[command(name = "altents")]
#[command(about = "Query and settle NEAR intents swaps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration; defaults plus ALTENTS_* overrides when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Token registry JSON; the bundled registry when omitted.
    #[arg(long, value_name = "FILE")]
    registry: Option<PathBuf>,

    #[arg(long, env = "ALTENTS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List bridgeable assets grouped by symbol
    Assets {
        /// Limit to a chain, as chain_type:chain_id or an EVM chain name
        /// (eth, base, arbitrum, ...); repeatable
        #[arg(long = "chain", value_name = "CHAIN")]
        chains: Vec<String>,
    },
    /// List registry assets with their USD prices
    Prices,
    /// Request a swap quote
    Quote {
        /// Input asset id, e.g. nep141:wrap.near
        from: String,
        /// Output asset id
        to: String,
        /// Human-readable input amount, e.g. 1.5
        amount: String,
    },
    /// Show aggregated deposited balances of an account
    Balance {
        account_id: String,
        /// Registry asset id; every registry asset when omitted
        asset_id: Option<String>,
    },
    /// Show the bridge deposit address for an account and origin asset
    DepositAddress {
        account_id: String,
        /// Origin asset as chain_type:chain_id[:address], e.g. eth:8453:native
        asset: DefuseAssetId,
    },
    /// Poll a published intent until it reaches a terminal status
    Status {
        intent_hash: String,
        /// Query the status once instead of polling
        #[arg(long)]
        once: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_level);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    let registry = match &cli.registry {
        Some(path) => TokenRegistry::from_file(path)?,
        None => TokenRegistry::embedded()?,
    };
    let client = IntentsClient::with_http(config)?;

    match cli.command {
        Commands::Assets { chains } => list_assets(&client, &registry, &chains).await,
        Commands::Prices => list_prices(&client, &registry).await,
        Commands::Quote { from, to, amount } => {
            quote(&client, &registry, &from, &to, &amount).await
        }
        Commands::Balance {
            account_id,
            asset_id,
        } => show_balances(&client, &registry, &account_id, asset_id.as_deref()).await,
        Commands::DepositAddress { account_id, asset } => {
            let address = client.bridge().deposit_address(&account_id, &asset).await?;
            println!("{address}");
            Ok(())
        }
        Commands::Status { intent_hash, once } => show_status(&client, &intent_hash, once).await,
    }
}

async fn list_assets(
    client: &IntentsClient,
    registry: &TokenRegistry,
    chains: &[String],
) -> Result<()> {
    let filters = chains
        .iter()
        .map(|chain| {
            chain_filter(chain).ok_or_else(|| Error::Config(format!("unknown chain {chain}")))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let filters = (!filters.is_empty()).then_some(filters.as_slice());

    let assets = client.bridgeable_assets(registry, filters).await?;
    info!("{} bridgeable symbols", assets.len());

    for asset in assets {
        println!("{} ({})", asset.symbol, asset.name);
        for variant in &asset.chain_variants {
            let chain = variant
                .chain_name
                .as_deref()
                .map(chain_display_name)
                .unwrap_or_else(|| variant.chain_type.clone());
            let chain = match variant.evm_chain_id() {
                Some(id) => format!("{chain} ({id})"),
                None => chain,
            };
            let address = if variant.is_native() {
                "native"
            } else {
                variant.address.as_str()
            };
            println!(
                "  {:<24} {:<44} {}",
                chain, variant.near_token_id, address
            );
        }
    }
    Ok(())
}

async fn list_prices(client: &IntentsClient, registry: &TokenRegistry) -> Result<()> {
    for priced in client.priced_assets(registry).await? {
        let price = priced
            .price()
            .map(|p| format!("${p:.4}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<12} {}",
            priced.asset.symbol,
            priced.asset.chain_name.as_deref().unwrap_or("-"),
            price
        );
    }
    Ok(())
}

async fn quote(
    client: &IntentsClient,
    registry: &TokenRegistry,
    from: &str,
    to: &str,
    amount: &str,
) -> Result<()> {
    let in_decimals = known_decimals(registry, from)?;
    let out_decimals = known_decimals(registry, to)?;
    let exact_amount_in = parse_units(amount, in_decimals)?;

    let Some(quote) = client
        .fetch_quote(from, to, &exact_amount_in.to_string())
        .await
    else {
        println!("No quote available");
        return Ok(());
    };

    let amount_out = num_bigint::BigUint::parse_bytes(quote.amount_out.as_bytes(), 10)
        .ok_or_else(|| Error::Amount(format!("invalid amount_out {:?}", quote.amount_out)))?;
    println!(
        "{} {} -> {} {}",
        amount,
        from,
        limit_decimals(&format_fixed_point(&amount_out, out_decimals), DISPLAY_DECIMALS),
        to
    );
    println!("quote {} expires {}", quote.quote_hash, quote.expiration_time);
    Ok(())
}

async fn show_balances(
    client: &IntentsClient,
    registry: &TokenRegistry,
    account_id: &str,
    asset_id: Option<&str>,
) -> Result<()> {
    info!(
        "Deposited balances of {} on {}",
        account_id,
        client.settlement().contract_id()
    );
    if let Some(asset_id) = asset_id {
        let asset = registry
            .get(asset_id)
            .ok_or_else(|| Error::Registry(format!("unknown asset {asset_id}")))?;
        let balance = client.asset_balance(account_id, asset).await?;
        println!(
            "{:<8} {}",
            asset.symbol,
            limit_decimals(&balance, DISPLAY_DECIMALS)
        );
        return Ok(());
    }

    for (asset, balance) in registry_balances(client, registry, account_id).await? {
        println!(
            "{:<8} {}",
            asset.symbol,
            limit_decimals(&balance, DISPLAY_DECIMALS)
        );
    }
    Ok(())
}

async fn show_status(client: &IntentsClient, intent_hash: &str, once: bool) -> Result<()> {
    if once {
        println!("{:?}", client.get_intent_status(intent_hash).await);
        return Ok(());
    }

    match client.poll_intent_status(intent_hash).await {
        PollOutcome::Settled { attempts } => println!("SETTLED after {attempts} polls"),
        PollOutcome::Invalid { attempts } => {
            println!("NOT_FOUND_OR_NOT_VALID_ANYMORE after {attempts} polls")
        }
        PollOutcome::TimedOut { attempts } => println!("still pending after {attempts} polls"),
    }
    Ok(())
}

fn known_decimals(registry: &TokenRegistry, id: &str) -> std::result::Result<u8, Error> {
    registry
        .decimals_of(id)
        .ok_or_else(|| Error::Registry(format!("unknown asset {id}")))
}

fn setup_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
