use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::mpsc::Receiver;
use tracing::{info, warn};

use crate::domain::alerts::{AlertBook, AlertId};
use crate::domain::events::NotificationSink;
use crate::domain::history::PriceHistory;
use crate::domain::ports::PriceFeed;
use crate::domain::types::{AlertDirection, MonitorEvent, PricePoint};

#[derive(Debug)]
pub enum MonitorCommand {
    Shutdown,
    /// Switch the watched coin; history and alerts are reset
    SelectCoin(String),
    AddAlert {
        threshold: f64,
        direction: AlertDirection,
    },
    RemoveAlert(AlertId),
    /// Run one update cycle now instead of waiting for the timer
    Refresh,
}

/// The single actor that owns the price history and the alert book
///
/// Everything reaches it as a message: the timer tick and the commands
/// feed one select loop, events leave over a broadcast channel, and no
/// other task ever touches the mutable state.
pub struct PriceMonitor {
    feed: Arc<dyn PriceFeed>,
    event_tx: broadcast::Sender<MonitorEvent>,
    cmd_rx: Option<Receiver<MonitorCommand>>,
    sinks: Vec<Arc<dyn NotificationSink>>,
    coin_id: String,
    vs_currency: String,
    update_interval: Duration,
    history: PriceHistory,
    alerts: AlertBook,
}

impl PriceMonitor {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        event_tx: broadcast::Sender<MonitorEvent>,
        cmd_rx: Option<Receiver<MonitorCommand>>,
        coin_id: String,
        vs_currency: String,
        update_interval: Duration,
        history_capacity: usize,
    ) -> Self {
        Self {
            feed,
            event_tx,
            cmd_rx,
            sinks: Vec::new(),
            coin_id,
            vs_currency,
            update_interval,
            history: PriceHistory::new(history_capacity),
            alerts: AlertBook::new(),
        }
    }

    pub fn add_sink(&mut self, sink: Arc<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    pub async fn run(&mut self) {
        info!(
            "PriceMonitor: watching '{}' in {} every {:?}",
            self.coin_id, self.vs_currency, self.update_interval
        );

        // The first tick completes immediately, so the initial price shows
        // up without waiting a full interval.
        let mut ticker = tokio::time::interval(self.update_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.update_cycle().await;
                }

                // Only poll cmd_rx if it exists
                maybe_cmd = async {
                    if let Some(rx) = &mut self.cmd_rx {
                        rx.recv().await
                    } else {
                        std::future::pending().await
                    }
                } => {
                    match maybe_cmd {
                        Some(cmd) => {
                            match cmd {
                                MonitorCommand::Shutdown => {
                                    warn!("PriceMonitor received Shutdown command. Exiting loop.");
                                    return;
                                }
                                MonitorCommand::SelectCoin(coin_id) => {
                                    if coin_id == self.coin_id {
                                        info!("PriceMonitor: coin unchanged, skipping switch");
                                        continue;
                                    }

                                    info!("PriceMonitor: switching '{}' -> '{}'", self.coin_id, coin_id);
                                    self.coin_id = coin_id;
                                    self.history.clear();
                                    self.alerts.clear();
                                    self.broadcast_alerts();

                                    // Refresh right away instead of waiting for the timer
                                    self.update_cycle().await;
                                }
                                MonitorCommand::AddAlert { threshold, direction } => {
                                    match self.alerts.add(threshold, direction) {
                                        Ok(id) => {
                                            info!(
                                                "PriceMonitor: alert {} registered ({} {})",
                                                id, direction, threshold
                                            );
                                            self.broadcast_alerts();
                                        }
                                        Err(e) => {
                                            warn!("PriceMonitor: alert rejected: {}", e);
                                            let _ = self.event_tx.send(MonitorEvent::AlertRejected { error: e });
                                        }
                                    }
                                }
                                MonitorCommand::RemoveAlert(id) => {
                                    if self.alerts.remove(id) {
                                        info!("PriceMonitor: alert {} removed", id);
                                        self.broadcast_alerts();
                                    }
                                }
                                MonitorCommand::Refresh => {
                                    self.update_cycle().await;
                                }
                            }
                        }
                        None => {
                            info!("PriceMonitor command channel closed.");
                            self.cmd_rx = None;
                        }
                    }
                }
            }
        }
    }

    /// One poll: fetch, append, evaluate, publish
    ///
    /// A failed fetch changes nothing and schedules nothing; the next tick
    /// is the only retry.
    async fn update_cycle(&mut self) {
        match self.feed.latest_price(&self.coin_id, &self.vs_currency).await {
            Ok(price) => {
                let point = PricePoint::now(price);
                self.history.push(point);

                let fired = self.alerts.evaluate(price);

                let _ = self.event_tx.send(MonitorEvent::PriceUpdated {
                    coin_id: self.coin_id.clone(),
                    point,
                    history: self.history.snapshot(),
                });

                for notification in &fired {
                    for sink in &self.sinks {
                        sink.on_alert(notification);
                    }
                    let _ = self
                        .event_tx
                        .send(MonitorEvent::AlertTriggered(notification.clone()));
                }

                if !fired.is_empty() {
                    self.broadcast_alerts();
                }
            }
            Err(e) => {
                warn!("PriceMonitor: fetch for '{}' failed: {}", self.coin_id, e);
                let _ = self.event_tx.send(MonitorEvent::FetchFailed {
                    coin_id: self.coin_id.clone(),
                    error: e,
                });
            }
        }
    }

    fn broadcast_alerts(&self) {
        let _ = self.event_tx.send(MonitorEvent::AlertsChanged {
            alerts: self.alerts.active(),
        });
    }
}
