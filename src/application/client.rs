use crate::application::agents::monitor::MonitorCommand;
use crate::application::system::SystemHandle;
use crate::config::Coin;
use crate::domain::alerts::AlertId;
use crate::domain::types::{AlertDirection, MonitorEvent};
use anyhow::Result;
use crossbeam_channel::Receiver;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::warn;

/// Unified event type for the User Interface
#[derive(Clone, Debug)]
pub enum SystemEvent {
    Monitor(MonitorEvent),
    Log(String),
}

/// A client interface for interacting with the monitor system.
/// Abstracts away channel management and provides a clean API for the UI/UserAgent.
pub struct SystemClient {
    log_rx: Receiver<String>,
    handle: SystemHandle,
}

impl SystemClient {
    pub fn new(handle: SystemHandle, log_rx: Receiver<String>) -> Self {
        Self { handle, log_rx }
    }

    /// Poll for the next available event from any channel.
    /// This is a non-blocking call that checks all channels in priority order.
    pub fn poll_next(&mut self) -> Option<SystemEvent> {
        // 1. Logs (high volume, simple strings)
        if let Ok(msg) = self.log_rx.try_recv() {
            return Some(SystemEvent::Log(msg));
        }

        // 2. Monitor events (prices, alerts)
        loop {
            match self.handle.event_rx.try_recv() {
                Ok(event) => return Some(SystemEvent::Monitor(event)),
                Err(TryRecvError::Lagged(skipped)) => {
                    // Slow frame: resume from the oldest event still buffered
                    warn!("UI fell behind the monitor, dropped {} events", skipped);
                }
                Err(_) => return None,
            }
        }
    }

    // --- Command Methods ---

    pub fn select_coin(&self, coin_id: &str) -> Result<()> {
        self.handle
            .monitor_cmd_tx
            .try_send(MonitorCommand::SelectCoin(coin_id.to_string()))
            .map_err(|e| anyhow::anyhow!("Failed to send coin selection: {}", e))
    }

    pub fn add_alert(&self, threshold: f64, direction: AlertDirection) -> Result<()> {
        self.handle
            .monitor_cmd_tx
            .try_send(MonitorCommand::AddAlert {
                threshold,
                direction,
            })
            .map_err(|e| anyhow::anyhow!("Failed to send alert registration: {}", e))
    }

    pub fn remove_alert(&self, id: AlertId) -> Result<()> {
        self.handle
            .monitor_cmd_tx
            .try_send(MonitorCommand::RemoveAlert(id))
            .map_err(|e| anyhow::anyhow!("Failed to send alert removal: {}", e))
    }

    pub fn refresh(&self) -> Result<()> {
        self.handle
            .monitor_cmd_tx
            .try_send(MonitorCommand::Refresh)
            .map_err(|e| anyhow::anyhow!("Failed to send refresh: {}", e))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.handle
            .monitor_cmd_tx
            .try_send(MonitorCommand::Shutdown)
            .map_err(|e| anyhow::anyhow!("Failed to send shutdown: {}", e))
    }

    // --- Accessors ---

    pub fn coins(&self) -> &[Coin] {
        &self.handle.coins
    }

    pub fn initial_coin(&self) -> &Coin {
        &self.handle.selected_coin
    }

    pub fn vs_currency(&self) -> &str {
        &self.handle.vs_currency
    }

    pub fn update_interval_secs(&self) -> u64 {
        self.handle.update_interval_secs
    }
}
