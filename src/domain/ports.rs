use async_trait::async_trait;

use crate::domain::errors::FeedError;
use crate::domain::types::PricePoint;

// Need async_trait for async functions in traits
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Current spot price of one coin in the given quote currency
    async fn latest_price(&self, coin_id: &str, vs_currency: &str) -> Result<f64, FeedError>;

    /// Recent price series for the coin, one window per call
    async fn market_series(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, FeedError>;
}
