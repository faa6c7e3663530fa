use reqwest::Client;
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the HTTP client used by feed adapters
    ///
    /// No retry layer: a failed poll is absorbed by the caller and the next
    /// timer tick is the only retry. The request timeout is the sole
    /// cancellation mechanism a slow fetch gets.
    pub fn create_client(timeout: Duration) -> Client {
        Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}
