use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::alerts::PriceAlert;
use crate::domain::errors::{AlertError, FeedError};
use crate::domain::events::AlertNotification;

/// A single observed price at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Builds a point stamped with the current time
    pub fn now(price: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            price,
        }
    }
}

/// Which side of the threshold an alert watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertDirection {
    Above,
    Below,
}

impl fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertDirection::Above => write!(f, "above"),
            AlertDirection::Below => write!(f, "below"),
        }
    }
}

impl FromStr for AlertDirection {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" | "over" => Ok(AlertDirection::Above),
            "below" | "under" => Ok(AlertDirection::Below),
            _ => Err(AlertError::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

/// Events broadcast by the monitor to any attached shell
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A fetch succeeded: the new point plus the full history window
    PriceUpdated {
        coin_id: String,
        point: PricePoint,
        history: Vec<PricePoint>,
    },
    /// The set of active (untriggered) alerts changed
    AlertsChanged { alerts: Vec<PriceAlert> },
    /// An alert crossed its threshold on this cycle
    AlertTriggered(AlertNotification),
    /// A fetch failed; state is unchanged and the next tick will try again
    FetchFailed { coin_id: String, error: FeedError },
    /// An alert registration was rejected by validation
    AlertRejected { error: AlertError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_str() {
        assert_eq!(AlertDirection::from_str("above").unwrap(), AlertDirection::Above);
        assert_eq!(AlertDirection::from_str("ABOVE").unwrap(), AlertDirection::Above);
        assert_eq!(AlertDirection::from_str("Below").unwrap(), AlertDirection::Below);
        assert_eq!(AlertDirection::from_str("under").unwrap(), AlertDirection::Below);
        assert!(AlertDirection::from_str("sideways").is_err());
    }

    #[test]
    fn test_direction_display_round_trips() {
        assert_eq!(AlertDirection::Above.to_string(), "above");
        assert_eq!(
            AlertDirection::from_str(&AlertDirection::Below.to_string()).unwrap(),
            AlertDirection::Below
        );
    }
}
