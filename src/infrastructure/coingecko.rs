//! CoinGecko market data feed
//!
//! Polling REST adapter for the public CoinGecko API:
//! - current spot prices (`/simple/price`)
//! - recent price series for charts (`/coins/{id}/market_chart`)
//!
//! There is no retry and no caching here: each call is one request, and a
//! failure is reported to the caller and forgotten.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::domain::errors::FeedError;
use crate::domain::ports::PriceFeed;
use crate::domain::types::PricePoint;

use super::http_client_factory::HttpClientFactory;

/// Shape of `/simple/price`: coin id -> currency -> price
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    /// Pairs of (unix millis, price)
    prices: Vec<(f64, f64)>,
}

pub struct CoinGeckoFeed {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoFeed {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Url::parse(base_url).with_context(|| format!("Invalid CoinGecko base URL: {}", base_url))?;

        Ok(Self {
            client: HttpClientFactory::create_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Starts a GET request, attaching the demo API key header when configured
    fn request(&self, url: &str) -> RequestBuilder {
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            req = req.header("x-cg-demo-api-key", key);
        }
        req
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn latest_price(&self, coin_id: &str, vs_currency: &str) -> Result<f64, FeedError> {
        let url = format!("{}/simple/price", self.base_url);
        debug!("Fetching spot price for '{}' from {}", coin_id, url);

        let response = self
            .request(&url)
            .query(&[("ids", coin_id), ("vs_currencies", vs_currency)])
            .send()
            .await
            .map_err(|e| transport_error(coin_id, e))?;

        let prices: SimplePriceResponse = decode_body(coin_id, response).await?;
        extract_price(&prices, coin_id, vs_currency)
    }

    async fn market_series(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, FeedError> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, coin_id);
        debug!("Fetching {}d market chart for '{}'", days, coin_id);

        let days = days.to_string();
        let response = self
            .request(&url)
            .query(&[("vs_currency", vs_currency), ("days", days.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(coin_id, e))?;

        let chart: MarketChartResponse = decode_body(coin_id, response).await?;
        Ok(points_from_chart(chart))
    }
}

/// Maps reqwest transport failures onto the feed taxonomy
fn transport_error(coin_id: &str, err: reqwest::Error) -> FeedError {
    if err.is_timeout() {
        FeedError::Timeout {
            coin_id: coin_id.to_string(),
        }
    } else {
        FeedError::Network {
            coin_id: coin_id.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Checks the HTTP status and decodes the JSON body
async fn decode_body<T: serde::de::DeserializeOwned>(
    coin_id: &str,
    response: reqwest::Response,
) -> Result<T, FeedError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(FeedError::NotFound {
            coin_id: coin_id.to_string(),
        });
    }
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(FeedError::Network {
            coin_id: coin_id.to_string(),
            reason: format!("HTTP {}: {}", status, error_text),
        });
    }

    response.json().await.map_err(|e| FeedError::InvalidData {
        coin_id: coin_id.to_string(),
        reason: format!("undecodable response: {}", e),
    })
}

/// Pulls one coin's quote out of a `/simple/price` response
///
/// CoinGecko answers unknown ids with HTTP 200 and an empty object, so the
/// missing key, not the status code, is what signals NotFound here.
fn extract_price(
    prices: &SimplePriceResponse,
    coin_id: &str,
    vs_currency: &str,
) -> Result<f64, FeedError> {
    let quotes = prices.get(coin_id).ok_or_else(|| FeedError::NotFound {
        coin_id: coin_id.to_string(),
    })?;

    let price = quotes
        .get(vs_currency)
        .copied()
        .ok_or_else(|| FeedError::InvalidData {
            coin_id: coin_id.to_string(),
            reason: format!("missing '{}' quote", vs_currency),
        })?;

    if !price.is_finite() || price <= 0.0 {
        return Err(FeedError::InvalidData {
            coin_id: coin_id.to_string(),
            reason: format!("non-positive price {}", price),
        });
    }

    Ok(price)
}

/// Converts chart rows to points, skipping rows with broken values
fn points_from_chart(chart: MarketChartResponse) -> Vec<PricePoint> {
    chart
        .prices
        .into_iter()
        .filter_map(|(ts_ms, price)| {
            if !price.is_finite() || price <= 0.0 {
                return None;
            }
            DateTime::from_timestamp_millis(ts_ms as i64)
                .map(|timestamp| PricePoint::new(timestamp, price))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_price_decoding() {
        let body = r#"{"bitcoin":{"usd":29123.45}}"#;
        let prices: SimplePriceResponse = serde_json::from_str(body).unwrap();

        let price = extract_price(&prices, "bitcoin", "usd").unwrap();
        assert_eq!(price, 29123.45);
    }

    #[test]
    fn test_missing_coin_key_is_not_found() {
        // Unknown ids come back as HTTP 200 with an empty object
        let prices: SimplePriceResponse = serde_json::from_str("{}").unwrap();

        let err = extract_price(&prices, "dogecoin2", "usd").unwrap_err();
        assert!(matches!(err, FeedError::NotFound { .. }));
    }

    #[test]
    fn test_missing_quote_currency_is_invalid_data() {
        let body = r#"{"bitcoin":{"eur":27000.0}}"#;
        let prices: SimplePriceResponse = serde_json::from_str(body).unwrap();

        let err = extract_price(&prices, "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, FeedError::InvalidData { .. }));
    }

    #[test]
    fn test_non_positive_price_is_invalid_data() {
        let body = r#"{"bitcoin":{"usd":0.0}}"#;
        let prices: SimplePriceResponse = serde_json::from_str(body).unwrap();

        let err = extract_price(&prices, "bitcoin", "usd").unwrap_err();
        assert!(matches!(err, FeedError::InvalidData { .. }));
    }

    #[test]
    fn test_market_chart_decoding() {
        let body = r#"{
            "prices": [[1700000000000, 36500.1], [1700003600000, 36620.8]],
            "market_caps": [[1700000000000, 713000000000.0]],
            "total_volumes": [[1700000000000, 21000000000.0]]
        }"#;
        let chart: MarketChartResponse = serde_json::from_str(body).unwrap();
        let points = points_from_chart(chart);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price, 36500.1);
        assert!(points[0].timestamp < points[1].timestamp);
    }

    #[test]
    fn test_market_chart_skips_broken_rows() {
        let chart = MarketChartResponse {
            prices: vec![(1.7e12, 100.0), (1.7e12, -5.0), (1.7e12, 101.0)],
        };

        let points = points_from_chart(chart);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_new_rejects_garbage_base_url() {
        assert!(CoinGeckoFeed::new("not a url", None, Duration::from_secs(5)).is_err());
        assert!(
            CoinGeckoFeed::new("https://api.coingecko.com/api/v3", None, Duration::from_secs(5))
                .is_ok()
        );
    }
}
