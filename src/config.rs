use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Which price feed implementation the system runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    Mock,
    CoinGecko,
}

impl FromStr for FeedMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(FeedMode::Mock),
            "coingecko" => Ok(FeedMode::CoinGecko),
            _ => anyhow::bail!("Invalid FEED_MODE: {}. Must be 'mock' or 'coingecko'", s),
        }
    }
}

/// One entry of the selectable coin catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    /// Human-readable name shown in the shell ("Bitcoin")
    pub label: String,
    /// CoinGecko id used on the wire ("bitcoin")
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_mode: FeedMode,
    pub api_base: String,
    /// Optional CoinGecko demo key, sent as the x-cg-demo-api-key header
    pub api_key: Option<String>,
    pub coins: Vec<Coin>,
    pub vs_currency: String,
    pub update_interval_secs: u64,
    pub max_history_points: usize,
    pub fetch_timeout_secs: u64,
}

/// Parses a "Label:id,Label:id" catalog string; entries without a colon are skipped
fn parse_coins(raw: &str) -> Vec<Coin> {
    let mut coins = Vec::new();
    for entry in raw.split(',') {
        if let Some((label, id)) = entry.split_once(':') {
            let label = label.trim();
            let id = id.trim();
            if !label.is_empty() && !id.is_empty() {
                coins.push(Coin {
                    label: label.to_string(),
                    id: id.to_string(),
                });
            }
        }
    }
    coins
}

const DEFAULT_COINS: &str =
    "Bitcoin:bitcoin,Ethereum:ethereum,Dogecoin:dogecoin,Cardano:cardano,Solana:solana";

impl Config {
    pub fn from_env() -> Result<Self> {
        let feed_mode_str = env::var("FEED_MODE").unwrap_or_else(|_| "coingecko".to_string());
        let feed_mode = FeedMode::from_str(&feed_mode_str)?;

        let api_base = env::var("COINGECKO_API_BASE")
            .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string());

        let api_key = env::var("COINGECKO_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let coins_str = env::var("COINS").unwrap_or_else(|_| DEFAULT_COINS.to_string());
        let coins = parse_coins(&coins_str);
        if coins.is_empty() {
            anyhow::bail!("COINS must contain at least one 'Label:id' entry, got '{}'", coins_str);
        }

        let vs_currency = env::var("VS_CURRENCY")
            .unwrap_or_else(|_| "usd".to_string())
            .to_lowercase();

        let update_interval_secs = env::var("UPDATE_INTERVAL_SECS")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u64>()
            .context("Failed to parse UPDATE_INTERVAL_SECS")?;

        let max_history_points = env::var("MAX_HISTORY_POINTS")
            .unwrap_or_else(|_| "50".to_string())
            .parse::<usize>()
            .context("Failed to parse MAX_HISTORY_POINTS")?;

        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("Failed to parse FETCH_TIMEOUT_SECS")?;

        Ok(Config {
            feed_mode,
            api_base,
            api_key,
            coins,
            vs_currency,
            update_interval_secs,
            max_history_points,
            fetch_timeout_secs,
        })
    }

    /// The coin selected at startup (first catalog entry)
    pub fn initial_coin(&self) -> &Coin {
        &self.coins[0]
    }

    /// Looks a catalog entry up by its CoinGecko id
    pub fn coin_by_id(&self, id: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    // Global lock to prevent race conditions when modifying environment variables in tests
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn get_env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    const VARS: &[&str] = &[
        "FEED_MODE",
        "COINGECKO_API_BASE",
        "COINGECKO_API_KEY",
        "COINS",
        "VS_CURRENCY",
        "UPDATE_INTERVAL_SECS",
        "MAX_HISTORY_POINTS",
        "FETCH_TIMEOUT_SECS",
    ];

    fn clear_vars() {
        for var in VARS {
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    fn test_parse_coins() {
        let coins = parse_coins("Bitcoin:bitcoin, Ethereum : ethereum");
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].label, "Bitcoin");
        assert_eq!(coins[0].id, "bitcoin");
        assert_eq!(coins[1].id, "ethereum");
    }

    #[test]
    fn test_parse_coins_skips_malformed_entries() {
        let coins = parse_coins("Bitcoin:bitcoin,nocolon,:noid,nolabel:");
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].id, "bitcoin");

        assert!(parse_coins("").is_empty());
        assert!(parse_coins("garbage").is_empty());
    }

    #[test]
    fn test_feed_mode_from_str() {
        assert_eq!(FeedMode::from_str("mock").unwrap(), FeedMode::Mock);
        assert_eq!(FeedMode::from_str("CoinGecko").unwrap(), FeedMode::CoinGecko);
        assert!(FeedMode::from_str("binance").is_err());
    }

    #[test]
    fn test_defaults() {
        let _guard = get_env_lock().lock().unwrap();
        clear_vars();

        let config = Config::from_env().unwrap();
        assert_eq!(config.feed_mode, FeedMode::CoinGecko);
        assert_eq!(config.api_base, "https://api.coingecko.com/api/v3");
        assert!(config.api_key.is_none());
        assert_eq!(config.coins.len(), 5);
        assert_eq!(config.initial_coin().id, "bitcoin");
        assert_eq!(config.vs_currency, "usd");
        assert_eq!(config.update_interval_secs, 20);
        assert_eq!(config.max_history_points, 50);
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_overrides_and_lookup() {
        let _guard = get_env_lock().lock().unwrap();
        clear_vars();
        unsafe {
            env::set_var("FEED_MODE", "mock");
            env::set_var("COINS", "Litecoin:litecoin");
            env::set_var("UPDATE_INTERVAL_SECS", "5");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.feed_mode, FeedMode::Mock);
        assert_eq!(config.update_interval_secs, 5);
        assert!(config.coin_by_id("litecoin").is_some());
        assert!(config.coin_by_id("bitcoin").is_none());

        clear_vars();
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let _guard = get_env_lock().lock().unwrap();
        clear_vars();
        unsafe { env::set_var("COINS", "no-colon-here") };

        assert!(Config::from_env().is_err());

        clear_vars();
    }
}
