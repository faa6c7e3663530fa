use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::domain::errors::FeedError;
use crate::domain::ports::PriceFeed;
use crate::domain::types::PricePoint;

/// Price feed that never touches the network
///
/// Two modes:
/// - simulation (default): every call advances a deterministic random walk
///   around a per-coin base price, for demo runs;
/// - scripted: tests queue exact outcomes with `push_price`/`push_error`,
///   consumed in order; once a coin's script runs dry the last price
///   repeats.
#[derive(Clone)]
pub struct MockPriceFeed {
    state: Arc<Mutex<MockState>>,
    simulation_enabled: bool,
}

struct MockState {
    prices: HashMap<String, f64>,
    scripts: HashMap<String, VecDeque<Result<f64, FeedError>>>,
    rng: StdRng,
}

const WALK_SEED: u64 = 42;

fn base_price(coin_id: &str) -> f64 {
    if coin_id.contains("bitcoin") {
        96_000.0
    } else if coin_id.contains("ethereum") {
        3_400.0
    } else if coin_id.contains("solana") {
        200.0
    } else if coin_id.contains("cardano") {
        1.2
    } else if coin_id.contains("dogecoin") {
        0.25
    } else {
        100.0
    }
}

impl MockPriceFeed {
    pub fn new() -> Self {
        info!("MockPriceFeed: simulation enabled");
        Self {
            state: Arc::new(Mutex::new(MockState {
                prices: HashMap::new(),
                scripts: HashMap::new(),
                rng: StdRng::seed_from_u64(WALK_SEED),
            })),
            simulation_enabled: true,
        }
    }

    /// Feed that only replays queued outcomes (for tests)
    pub fn scripted() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                prices: HashMap::new(),
                scripts: HashMap::new(),
                rng: StdRng::seed_from_u64(WALK_SEED),
            })),
            simulation_enabled: false,
        }
    }

    pub fn push_price(&self, coin_id: &str, price: f64) {
        let mut state = self.lock_state();
        state
            .scripts
            .entry(coin_id.to_string())
            .or_default()
            .push_back(Ok(price));
    }

    pub fn push_error(&self, coin_id: &str, err: FeedError) {
        let mut state = self.lock_state();
        state
            .scripts
            .entry(coin_id.to_string())
            .or_default()
            .push_back(Err(err));
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, MockState> {
        // The lock is only held for short synchronous sections, so a
        // poisoned mutex here means a test already failed elsewhere.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MockPriceFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn latest_price(&self, coin_id: &str, _vs_currency: &str) -> Result<f64, FeedError> {
        let mut state = self.lock_state();

        // Scripted outcomes win over the walk
        if let Some(script) = state.scripts.get_mut(coin_id) {
            if let Some(outcome) = script.pop_front() {
                if let Ok(price) = outcome {
                    state.prices.insert(coin_id.to_string(), price);
                }
                return outcome;
            }
        }

        if !self.simulation_enabled {
            // Script ran dry: repeat the last known price
            return state.prices.get(coin_id).copied().ok_or_else(|| {
                FeedError::Network {
                    coin_id: coin_id.to_string(),
                    reason: "no scripted price queued".to_string(),
                }
            });
        }

        let current = state
            .prices
            .get(coin_id)
            .copied()
            .unwrap_or_else(|| base_price(coin_id));

        // -0.5% to +0.5% step per call
        let change_pct = state.rng.random_range(-0.005..0.005);
        let new_price = current * (1.0 + change_pct);
        state.prices.insert(coin_id.to_string(), new_price);

        Ok(new_price)
    }

    async fn market_series(
        &self,
        coin_id: &str,
        _vs_currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, FeedError> {
        let hours = (days.max(1) as i64) * 24;
        let mut state = self.lock_state();

        let mut price = state
            .prices
            .get(coin_id)
            .copied()
            .unwrap_or_else(|| base_price(coin_id));

        let now = Utc::now();
        let mut points = Vec::with_capacity(hours as usize);
        for h in (0..hours).rev() {
            let change_pct = state.rng.random_range(-0.01..0.01);
            price *= 1.0 + change_pct;
            points.push(PricePoint::new(now - ChronoDuration::hours(h), price));
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_outcomes_are_consumed_in_order() {
        let feed = MockPriceFeed::scripted();
        feed.push_price("bitcoin", 100.0);
        feed.push_price("bitcoin", 101.0);
        feed.push_error(
            "bitcoin",
            FeedError::Timeout {
                coin_id: "bitcoin".to_string(),
            },
        );

        assert_eq!(feed.latest_price("bitcoin", "usd").await.unwrap(), 100.0);
        assert_eq!(feed.latest_price("bitcoin", "usd").await.unwrap(), 101.0);
        assert!(matches!(
            feed.latest_price("bitcoin", "usd").await,
            Err(FeedError::Timeout { .. })
        ));

        // Script exhausted: last successful price repeats
        assert_eq!(feed.latest_price("bitcoin", "usd").await.unwrap(), 101.0);
    }

    #[tokio::test]
    async fn test_scripted_feed_with_no_script_errors() {
        let feed = MockPriceFeed::scripted();
        assert!(feed.latest_price("bitcoin", "usd").await.is_err());
    }

    #[tokio::test]
    async fn test_scripts_are_per_coin() {
        let feed = MockPriceFeed::scripted();
        feed.push_price("bitcoin", 50_000.0);
        feed.push_price("ethereum", 3_000.0);

        assert_eq!(feed.latest_price("ethereum", "usd").await.unwrap(), 3_000.0);
        assert_eq!(feed.latest_price("bitcoin", "usd").await.unwrap(), 50_000.0);
    }

    #[tokio::test]
    async fn test_simulation_walks_around_base_price() {
        let feed = MockPriceFeed::new();

        let first = feed.latest_price("bitcoin", "usd").await.unwrap();
        let second = feed.latest_price("bitcoin", "usd").await.unwrap();

        // One step moves at most 0.5%
        assert!((first - 96_000.0).abs() / 96_000.0 < 0.006);
        assert!((second - first).abs() / first < 0.006);
    }

    #[tokio::test]
    async fn test_market_series_is_chronological() {
        let feed = MockPriceFeed::new();
        let points = feed.market_series("ethereum", "usd", 1).await.unwrap();

        assert_eq!(points.len(), 24);
        for pair in points.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }
}
