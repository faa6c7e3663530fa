use std::collections::VecDeque;

use crate::domain::types::PricePoint;

/// How many points a history keeps when no capacity is configured
pub const DEFAULT_HISTORY_POINTS: usize = 50;

/// Bounded, chronologically ordered window of observed prices
///
/// Once the window is full, each new point evicts the single oldest one,
/// so the buffer always holds the most recent `capacity` observations.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    points: VecDeque<PricePoint>,
    capacity: usize,
}

impl PriceHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a point, evicting the oldest one if the window is full
    pub fn push(&mut self, point: PricePoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Empties the window (used when the watched coin changes)
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Owned copy of the window, oldest first
    pub fn snapshot(&self) -> Vec<PricePoint> {
        self.points.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<PricePoint> {
        self.points.back().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(price: f64) -> PricePoint {
        PricePoint::now(price)
    }

    #[test]
    fn test_push_keeps_chronological_order() {
        let mut history = PriceHistory::new(10);
        for p in [1.0, 2.0, 3.0] {
            history.push(point(p));
        }

        let snap = history.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[0].price, 1.0);
        assert_eq!(snap[2].price, 3.0);
        assert_eq!(history.latest().unwrap().price, 3.0);
    }

    #[test]
    fn test_eviction_drops_oldest_first() {
        let mut history = PriceHistory::new(50);
        for i in 1..=60 {
            history.push(point(i as f64));
        }

        // 60 pushes into a 50-slot window: points 1..=10 are gone
        assert_eq!(history.len(), 50);
        let snap = history.snapshot();
        assert_eq!(snap[0].price, 11.0);
        assert_eq!(snap[49].price, 60.0);
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let mut history = PriceHistory::new(3);
        for i in 0..100 {
            history.push(point(i as f64));
            assert!(history.len() <= 3);
        }
        assert_eq!(history.snapshot().iter().map(|p| p.price).collect::<Vec<_>>(), vec![97.0, 98.0, 99.0]);
    }

    #[test]
    fn test_clear_resets_window() {
        let mut history = PriceHistory::new(5);
        history.push(point(42.0));
        history.clear();

        assert!(history.is_empty());
        assert!(history.latest().is_none());
        assert!(history.snapshot().is_empty());

        // Usable again after the reset
        history.push(point(7.0));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = PriceHistory::new(0);
        history.push(point(1.0));
        history.push(point(2.0));

        assert_eq!(history.capacity(), 1);
        assert_eq!(history.latest().unwrap().price, 2.0);
    }
}
