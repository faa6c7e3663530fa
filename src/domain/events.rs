use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::domain::alerts::AlertId;
use crate::domain::types::AlertDirection;

/// Record of one alert firing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotification {
    pub alert_id: AlertId,
    pub threshold: f64,
    pub direction: AlertDirection,
    /// The price that caused the trigger
    pub price: f64,
    pub at: DateTime<Utc>,
}

impl fmt::Display for AlertNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            AlertDirection::Above => {
                write!(f, "Price has risen above threshold: ${}", self.threshold)
            }
            AlertDirection::Below => {
                write!(f, "Price has fallen below threshold: ${}", self.threshold)
            }
        }
    }
}

/// Receiver for alert notifications
///
/// The monitor marks an alert as triggered before any sink runs, so sinks
/// see each notification at most once and a misbehaving sink cannot cause
/// a re-fire.
pub trait NotificationSink: Send + Sync {
    fn on_alert(&self, notification: &AlertNotification);
}

/// Default sink that writes notifications to the log
pub struct LoggingSink;

impl NotificationSink for LoggingSink {
    fn on_alert(&self, notification: &AlertNotification) {
        warn!("Price Alert: {} (at ${})", notification, notification.price);
    }
}
