use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use crate::application::agents::monitor::{MonitorCommand, PriceMonitor};
use crate::config::{Coin, Config, FeedMode};
use crate::domain::events::LoggingSink;
use crate::domain::ports::PriceFeed;
use crate::domain::types::MonitorEvent;
use crate::infrastructure::{CoinGeckoFeed, MockPriceFeed};

/// Everything a shell needs to talk to the running system
pub struct SystemHandle {
    pub monitor_cmd_tx: mpsc::Sender<MonitorCommand>,
    /// Pre-subscribed receiver; created before the monitor starts so the
    /// very first price update is not missed
    pub event_rx: broadcast::Receiver<MonitorEvent>,
    /// Kept for additional subscribers
    pub event_tx: broadcast::Sender<MonitorEvent>,
    pub coins: Vec<Coin>,
    pub selected_coin: Coin,
    pub vs_currency: String,
    pub update_interval_secs: u64,
}

pub struct Application {
    pub config: Config,
    pub feed: Arc<dyn PriceFeed>,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!(
            "Building Pricewatch Application (Feed: {:?})...",
            config.feed_mode
        );

        let feed: Arc<dyn PriceFeed> = match config.feed_mode {
            FeedMode::Mock => {
                info!("Using mock price feed");
                Arc::new(MockPriceFeed::new())
            }
            FeedMode::CoinGecko => {
                info!("Using CoinGecko feed ({})", config.api_base);
                Arc::new(CoinGeckoFeed::new(
                    &config.api_base,
                    config.api_key.clone(),
                    Duration::from_secs(config.fetch_timeout_secs),
                )?)
            }
        };

        Ok(Self { config, feed })
    }

    pub async fn start(self) -> Result<SystemHandle> {
        info!("Starting monitor...");

        let (monitor_cmd_tx, monitor_cmd_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = broadcast::channel(64);

        let initial_coin = self.config.initial_coin().clone();

        let mut monitor = PriceMonitor::new(
            self.feed.clone(),
            event_tx.clone(),
            Some(monitor_cmd_rx),
            initial_coin.id.clone(),
            self.config.vs_currency.clone(),
            Duration::from_secs(self.config.update_interval_secs),
            self.config.max_history_points,
        );
        monitor.add_sink(Arc::new(LoggingSink));

        tokio::spawn(async move {
            monitor.run().await;
        });

        Ok(SystemHandle {
            monitor_cmd_tx,
            event_rx,
            event_tx,
            coins: self.config.coins.clone(),
            selected_coin: initial_coin,
            vs_currency: self.config.vs_currency.clone(),
            update_interval_secs: self.config.update_interval_secs,
        })
    }
}
