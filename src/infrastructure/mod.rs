pub mod coingecko;
pub mod http_client_factory;
pub mod mock;

pub use coingecko::CoinGeckoFeed;
pub use mock::MockPriceFeed;
