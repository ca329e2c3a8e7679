//! `satswap` command line: offline pricing tools and configuration inspection

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use satswap_amm::{
    tick_range_from_prices, BondingCurve, LiquidityMath, PoolPrice, PriceScale, TickMath,
};
use satswap_config::{load_config, resolve_config_path, TraderConfig};
use satswap_trader::{estimate_routing_fee, invoice_amount_sats};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "satswap", author, version, about = "SatSwap trading client tools", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to $SATSWAP_CONFIG, then the built-in path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Environment overlay under <config dir>/environments
    #[arg(short, long, global = true)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective configuration as TOML
    Config,
    /// Usable ticks for a human price range
    Ticks {
        #[arg(long)]
        lower: Decimal,
        #[arg(long)]
        upper: Decimal,
        #[arg(long)]
        spacing: i32,
        #[arg(long, default_value_t = 8)]
        base_decimals: u32,
        #[arg(long, default_value_t = 8)]
        quote_decimals: u32,
        /// Quote prices in asset B per asset A instead of A per B
        #[arg(long)]
        base_is_b: bool,
    },
    /// Human price at a tick
    Price {
        #[arg(long, allow_hyphen_values = true)]
        tick: i32,
        #[arg(long, default_value_t = 8)]
        base_decimals: u32,
        #[arg(long, default_value_t = 8)]
        quote_decimals: u32,
        #[arg(long)]
        base_is_b: bool,
    },
    /// Size a concentrated deposit at the current tick
    Deposit {
        #[arg(long, allow_hyphen_values = true)]
        current_tick: i32,
        #[arg(long, allow_hyphen_values = true)]
        tick_lower: i32,
        #[arg(long, allow_hyphen_values = true)]
        tick_upper: i32,
        #[arg(long)]
        amount_a: u128,
        #[arg(long)]
        amount_b: u128,
    },
    /// Virtual reserves for a single-sided launch
    Launch {
        #[arg(long)]
        supply: u128,
        #[arg(long)]
        threshold_pct: u32,
        #[arg(long)]
        raise: u128,
    },
    /// Amount and routing budget of a Lightning invoice
    Invoice { invoice: String },
}

#[derive(Serialize)]
struct InvoiceSummary {
    amount_sats: Option<u128>,
    routing_fee_sats: Option<u128>,
}

fn init_tracing(config: &TraderConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_config(cli: &Cli) -> Result<TraderConfig> {
    let path = resolve_config_path(cli.config.clone());
    if path.exists() {
        return load_config(Some(&path), cli.environment.as_deref());
    }
    if cli.config.is_some() {
        anyhow::bail!("config file {} not found", path.display());
    }
    Ok(TraderConfig::default())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_tracing(&config);
    info!("satswap {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Config => print!("{}", config.to_toml_string()?),
        Command::Ticks {
            lower,
            upper,
            spacing,
            base_decimals,
            quote_decimals,
            base_is_b,
        } => {
            let scale = PriceScale::new(base_decimals, quote_decimals, !base_is_b)?;
            let range = tick_range_from_prices(lower, upper, &scale, spacing)
                .context("price range does not map to usable ticks")?;
            if range.actual_price_lower != lower || range.actual_price_upper != upper {
                warn!(
                    "range widened to [{}, {}] by tick spacing",
                    range.actual_price_lower, range.actual_price_upper
                );
            }
            print_json(&range)?;
        }
        Command::Price {
            tick,
            base_decimals,
            quote_decimals,
            base_is_b,
        } => {
            let scale = PriceScale::new(base_decimals, quote_decimals, !base_is_b)?;
            let price = TickMath::tick_to_price(tick)?;
            println!("{}", scale.to_human_price(&price)?);
        }
        Command::Deposit {
            current_tick,
            tick_lower,
            tick_upper,
            amount_a,
            amount_b,
        } => {
            let current = PoolPrice::at_tick(current_tick)?;
            let quote = LiquidityMath::liquidity_from_amounts(
                &current, tick_lower, tick_upper, amount_a, amount_b,
            )?;
            print_json(&quote)?;
        }
        Command::Launch {
            supply,
            threshold_pct,
            raise,
        } => {
            let reserves = BondingCurve::calculate_virtual_reserves(supply, threshold_pct, raise)?;
            print_json(&reserves)?;
        }
        Command::Invoice { invoice } => {
            let amount_sats = invoice_amount_sats(&invoice)?;
            let routing_fee_sats = amount_sats.map(|amount| {
                estimate_routing_fee(
                    amount,
                    config.execution.routing_fee_bps,
                    config.execution.min_routing_fee_sats,
                )
            });
            print_json(&InvoiceSummary {
                amount_sats,
                routing_fee_sats,
            })?;
        }
    }

    Ok(())
}
