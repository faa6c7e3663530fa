//! Pricewatch Headless - price monitor without a GUI
//!
//! This binary runs the monitor loop and streams every update to stdout,
//! suitable for terminals and server deployments. It also exposes a
//! one-shot `series` command that dumps a coin's recent price history
//! and exits.
//!
//! # Usage
//! ```sh
//! FEED_MODE=mock cargo run --bin headless -- watch
//! cargo run --bin headless -- series --coin bitcoin --days 1
//! ```
//!
//! # Environment Variables
//! - `FEED_MODE` - 'coingecko' (default) or 'mock'
//! - `UPDATE_INTERVAL_SECS` - seconds between polls (default: 20)

use anyhow::Result;
use clap::{Parser, Subcommand};
use pricewatch::application::agents::monitor::MonitorCommand;
use pricewatch::application::system::Application;
use pricewatch::config::Config;
use pricewatch::domain::types::MonitorEvent;
use tokio::sync::broadcast;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Pricewatch headless monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor and print updates until Ctrl+C
    Watch,
    /// Fetch a coin's recent price series and exit
    Series {
        /// CoinGecko id of the coin
        #[arg(short, long, default_value = "bitcoin")]
        coin: String,

        /// Days of history to request
        #[arg(short, long, default_value = "1")]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Setup logging (stdout only, no UI channel needed)
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();

    info!("Pricewatch Headless {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Feed={:?}, Coins={}, Interval={}s",
        config.feed_mode,
        config.coins.len(),
        config.update_interval_secs
    );

    match cli.command {
        Commands::Watch => watch(config).await,
        Commands::Series { coin, days } => series(config, &coin, days).await,
    }
}

async fn watch(config: Config) -> Result<()> {
    let app = Application::build(config).await?;
    let mut handle = app.start().await?;

    info!("Price monitor running. Press Ctrl+C to shutdown.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting...");
                let _ = handle.monitor_cmd_tx.send(MonitorCommand::Shutdown).await;
                break;
            }
            event = handle.event_rx.recv() => match event {
                Ok(MonitorEvent::PriceUpdated { coin_id, point, history }) => {
                    info!(
                        "{}: ${:.2} ({} points tracked)",
                        coin_id,
                        point.price,
                        history.len()
                    );
                }
                Ok(MonitorEvent::AlertsChanged { alerts }) => {
                    info!("Active alerts: {}", alerts.len());
                }
                // Triggers, rejections and fetch failures already come
                // through the log stream
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event stream lagged, dropped {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    Ok(())
}

async fn series(config: Config, coin: &str, days: u32) -> Result<()> {
    let vs_currency = config.vs_currency.clone();
    let app = Application::build(config).await?;

    let points = app.feed.market_series(coin, &vs_currency, days).await?;
    info!("{} points for '{}' over {} day(s)", points.len(), coin, days);

    for p in &points {
        println!("{}\t{:.4}", p.timestamp.format("%Y-%m-%d %H:%M:%S"), p.price);
    }

    Ok(())
}
