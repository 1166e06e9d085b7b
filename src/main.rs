//! Candle tracker - headless OHLC tracking daemon
//!
//! Seeds a rolling window of candles per (product, granularity) from exchange
//! history, then closes one candle per period and keeps indicators current.
//! Metrics are pushed via structured JSON logs to stdout.
//!
//! # Usage
//! ```sh
//! PRICE_CACHE_SIZE=200 cargo run -- --products BTC-USD,ETH-USD --granularities 1m,5m
//! ```

use anyhow::{Context, Result};
use candle_tracker::application::system::Application;
use candle_tracker::config::Config;
use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "candle-tracker", version, about = "Rolling OHLC candle tracker")]
struct Cli {
    /// Comma-separated products, overrides PRODUCTS
    #[arg(long)]
    products: Option<String>,

    /// Comma-separated granularities (seconds or 1m,5m,15m,1h,6h,1d), overrides GRANULARITIES
    #[arg(long)]
    granularities: Option<String>,

    /// Dotenv file to load instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Candle tracker {} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(products) = &cli.products {
        config = config.with_products(products)?;
    }
    if let Some(granularities) = &cli.granularities {
        config = config.with_granularities(granularities)?;
    }
    info!(
        "Configuration loaded: Mode={:?}, Products={:?}, Granularities={:?}, Cache={}",
        config.mode, config.products, config.granularities, config.price_cache_size
    );

    let app = Application::build(config).await?;
    let handle = app.start().await?;

    info!("Running. Press Ctrl+C to shutdown.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Stopping timers...");

    handle.shutdown().await;
    Ok(())
}
