use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::AlertError;
use crate::domain::events::AlertNotification;
use crate::domain::types::AlertDirection;

pub type AlertId = Uuid;

/// A single threshold alert
///
/// Alerts are identified by id, not by value: two alerts with the same
/// threshold and direction are distinct entries and both fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: AlertId,
    pub threshold: f64,
    pub direction: AlertDirection,
    pub created_at: DateTime<Utc>,
    pub triggered: bool,
}

impl PriceAlert {
    /// Whether a price satisfies this alert's condition
    ///
    /// The comparison is inclusive: an alert fires when the price is at or
    /// past the threshold, not only on a strict crossing. An alert created
    /// on the "wrong" side of the market therefore fires on the very next
    /// evaluation.
    pub fn is_hit(&self, price: f64) -> bool {
        match self.direction {
            AlertDirection::Above => price >= self.threshold,
            AlertDirection::Below => price <= self.threshold,
        }
    }
}

/// The full set of alerts for the currently watched coin
///
/// Insertion order is preserved everywhere: `active` lists alerts in the
/// order they were added, and `evaluate` reports newly triggered alerts in
/// that same order.
#[derive(Debug, Default)]
pub struct AlertBook {
    alerts: Vec<PriceAlert>,
}

impl AlertBook {
    pub fn new() -> Self {
        Self { alerts: Vec::new() }
    }

    /// Registers a new alert
    ///
    /// The threshold must be a finite number greater than zero; anything
    /// else is rejected without touching the book.
    pub fn add(&mut self, threshold: f64, direction: AlertDirection) -> Result<AlertId, AlertError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(AlertError::InvalidThreshold { value: threshold });
        }

        let alert = PriceAlert {
            id: Uuid::new_v4(),
            threshold,
            direction,
            created_at: Utc::now(),
            triggered: false,
        };
        let id = alert.id;
        self.alerts.push(alert);
        Ok(id)
    }

    /// Checks every untriggered alert against a freshly observed price
    ///
    /// Alerts that qualify are marked triggered before anything is
    /// reported, so an alert fires at most once no matter how many later
    /// prices would also satisfy it.
    pub fn evaluate(&mut self, price: f64) -> Vec<AlertNotification> {
        let mut fired = Vec::new();
        for alert in self.alerts.iter_mut() {
            if alert.triggered || !alert.is_hit(price) {
                continue;
            }
            alert.triggered = true;
            fired.push(AlertNotification {
                alert_id: alert.id,
                threshold: alert.threshold,
                direction: alert.direction,
                price,
                at: Utc::now(),
            });
        }
        fired
    }

    /// Alerts still waiting to fire, in insertion order
    pub fn active(&self) -> Vec<PriceAlert> {
        self.alerts.iter().filter(|a| !a.triggered).cloned().collect()
    }

    /// Removes an alert; unknown ids are a silent no-op
    pub fn remove(&mut self, id: AlertId) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    /// Drops every alert (used when the watched coin changes)
    pub fn clear(&mut self) {
        self.alerts.clear();
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_rejects_bad_thresholds() {
        let mut book = AlertBook::new();

        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = book.add(bad, AlertDirection::Above).unwrap_err();
            assert!(matches!(err, AlertError::InvalidThreshold { .. }));
        }
        assert!(book.is_empty()); // Nothing slipped in
    }

    #[test]
    fn test_above_fires_at_or_past_threshold() {
        let mut book = AlertBook::new();
        book.add(30_000.0, AlertDirection::Above).unwrap();

        assert!(book.evaluate(29_000.0).is_empty());

        let fired = book.evaluate(30_500.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].threshold, 30_000.0);
        assert_eq!(fired[0].price, 30_500.0);

        // Still past the threshold, but the alert already fired
        assert!(book.evaluate(31_000.0).is_empty());
    }

    #[test]
    fn test_exact_threshold_counts_as_hit() {
        let mut book = AlertBook::new();
        book.add(100.0, AlertDirection::Above).unwrap();
        book.add(100.0, AlertDirection::Below).unwrap();

        // Inclusive comparison: both directions fire at exactly 100
        let fired = book.evaluate(100.0);
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn test_below_alert_already_past_fires_immediately() {
        let mut book = AlertBook::new();
        book.add(100.0, AlertDirection::Below).unwrap();

        // First evaluation after creation, price already below
        let fired = book.evaluate(50.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].direction, AlertDirection::Below);
    }

    #[test]
    fn test_evaluate_reports_in_insertion_order() {
        let mut book = AlertBook::new();
        let first = book.add(300.0, AlertDirection::Above).unwrap();
        let second = book.add(200.0, AlertDirection::Above).unwrap();
        let third = book.add(400.0, AlertDirection::Above).unwrap();

        let fired = book.evaluate(350.0);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].alert_id, first);
        assert_eq!(fired[1].alert_id, second);

        let fired = book.evaluate(450.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].alert_id, third);
    }

    #[test]
    fn test_active_excludes_triggered() {
        let mut book = AlertBook::new();
        let low = book.add(10.0, AlertDirection::Below).unwrap();
        let high = book.add(1_000.0, AlertDirection::Above).unwrap();

        assert_eq!(book.active().len(), 2);

        book.evaluate(5.0); // Fires the Below alert
        let active = book.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, high);
        assert_ne!(active[0].id, low);
    }

    #[test]
    fn test_duplicate_alerts_are_distinct() {
        let mut book = AlertBook::new();
        let a = book.add(500.0, AlertDirection::Above).unwrap();
        let b = book.add(500.0, AlertDirection::Above).unwrap();
        assert_ne!(a, b);

        let fired = book.evaluate(600.0);
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn test_remove_is_noop_for_unknown_id() {
        let mut book = AlertBook::new();
        book.add(100.0, AlertDirection::Above).unwrap();

        assert!(!book.remove(Uuid::new_v4()));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_remove_deletes_by_id() {
        let mut book = AlertBook::new();
        let keep = book.add(100.0, AlertDirection::Above).unwrap();
        let drop = book.add(200.0, AlertDirection::Above).unwrap();

        assert!(book.remove(drop));
        let active = book.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep);
    }

    #[test]
    fn test_clear_leaves_empty_book() {
        let mut book = AlertBook::new();
        book.add(100.0, AlertDirection::Above).unwrap();
        book.add(200.0, AlertDirection::Below).unwrap();

        book.clear();
        assert!(book.is_empty());
        assert!(book.active().is_empty());
        assert!(book.evaluate(150.0).is_empty());
    }
}
