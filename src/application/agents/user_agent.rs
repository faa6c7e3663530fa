use crate::application::client::{SystemClient, SystemEvent};
use crate::config::Coin;
use crate::domain::alerts::{AlertId, PriceAlert};
use crate::domain::types::{AlertDirection, MonitorEvent, PricePoint};

/// Shell-side state holder
///
/// Keeps everything the rendering layer shows, drained from the
/// `SystemClient` once per frame. No egui types in here, so the state
/// logic stays testable without a window.
pub struct UserAgent {
    client: SystemClient,

    // UI State
    pub coins: Vec<Coin>,
    pub selected_coin: Coin,
    pub vs_currency: String,
    pub latest: Option<PricePoint>,
    pub history: Vec<PricePoint>,
    pub active_alerts: Vec<PriceAlert>,
    pub notifications: Vec<String>,
    pub logs: Vec<String>,
    pub threshold_input: String,
    pub direction_input: AlertDirection,
    pub status_line: String,
    pub error_banner: Option<String>,
}

impl UserAgent {
    pub fn new(client: SystemClient) -> Self {
        let coins = client.coins().to_vec();
        let selected_coin = client.initial_coin().clone();
        let vs_currency = client.vs_currency().to_string();

        Self {
            client,
            coins,
            selected_coin,
            vs_currency,
            latest: None,
            history: Vec::new(),
            active_alerts: Vec::new(),
            notifications: Vec::new(),
            logs: Vec::new(),
            threshold_input: String::new(),
            direction_input: AlertDirection::Above,
            status_line: "Waiting for first update...".to_string(),
            error_banner: None,
        }
    }

    /// Drains all pending events into local state
    pub fn update(&mut self) {
        while let Some(event) = self.client.poll_next() {
            match event {
                SystemEvent::Log(msg) => {
                    self.logs.push(msg);
                    // Keep the feed manageable
                    if self.logs.len() > 1000 {
                        self.logs.drain(0..100);
                    }
                }
                SystemEvent::Monitor(event) => self.apply(event),
            }
        }
    }

    fn apply(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::PriceUpdated {
                coin_id,
                point,
                history,
            } => {
                if coin_id != self.selected_coin.id {
                    return; // Late update from a coin we already switched away from
                }
                self.latest = Some(point);
                self.history = history;
                self.status_line = format!("Updated {}", point.timestamp.format("%H:%M:%S"));
            }
            MonitorEvent::AlertsChanged { alerts } => {
                self.active_alerts = alerts;
            }
            MonitorEvent::AlertTriggered(n) => {
                self.notifications
                    .push(format!("[{}] {}", n.at.format("%H:%M:%S"), n));
                if self.notifications.len() > 100 {
                    self.notifications.remove(0);
                }
            }
            MonitorEvent::FetchFailed { coin_id, error } => {
                if coin_id == self.selected_coin.id {
                    self.status_line = format!("Fetch failed: {}", error);
                }
            }
            MonitorEvent::AlertRejected { error } => {
                self.error_banner = Some(error.to_string());
            }
        }
    }

    /// Switches the watched coin; the monitor confirms with fresh events
    pub fn select_coin(&mut self, coin: Coin) {
        if coin.id == self.selected_coin.id {
            return;
        }
        if let Err(e) = self.client.select_coin(&coin.id) {
            self.error_banner = Some(e.to_string());
            return;
        }

        self.selected_coin = coin;
        self.latest = None;
        self.history.clear();
        self.active_alerts.clear();
        self.status_line = "Switching...".to_string();
    }

    /// Parses the threshold input and registers the alert
    ///
    /// Unparsable text never leaves the shell; out-of-range numbers go to
    /// the monitor and come back as an AlertRejected event.
    pub fn submit_alert(&mut self) {
        let raw = self.threshold_input.trim().to_string();
        if raw.is_empty() {
            return;
        }

        match raw.parse::<f64>() {
            Ok(threshold) => match self.client.add_alert(threshold, self.direction_input) {
                Ok(()) => {
                    self.threshold_input.clear();
                    self.error_banner = None;
                }
                Err(e) => self.error_banner = Some(e.to_string()),
            },
            Err(_) => {
                self.error_banner = Some(format!("Invalid threshold: '{}'", raw));
            }
        }
    }

    pub fn remove_alert(&mut self, id: AlertId) {
        if let Err(e) = self.client.remove_alert(id) {
            self.error_banner = Some(e.to_string());
        }
    }

    pub fn refresh(&mut self) {
        if let Err(e) = self.client.refresh() {
            self.error_banner = Some(e.to_string());
        }
    }
}
