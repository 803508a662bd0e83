use crate::fetch::{parse_hourly, FetchError, HourlySeries, SeriesQuery, WeatherFetcher};
use log::{debug, info, warn};
use reqwest::Client;
use std::time::Duration;

/// Open-Meteo historical archive endpoint.
pub const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Connection settings for the archive client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Attempts per request, including the first
    pub max_tries: u32,
    /// Delay before the first retry; doubled on each further retry
    pub retry_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ARCHIVE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_tries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Hourly series client for the Open-Meteo archive API.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    config: ClientConfig,
}

impl OpenMeteoClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::FetchFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// One request, no retries.
    async fn fetch_once(&self, query: &SeriesQuery) -> Result<HourlySeries, FetchError> {
        let request = self
            .client
            .get(&self.config.base_url)
            .query(&query.query_pairs())
            .build()
            .map_err(|e| FetchError::FetchFailed(e.to_string()))?;
        debug!("GET {}", request.url());
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| FetchError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::FetchFailed(format!(
                "API request failed with status {status}"
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::FetchFailed(e.to_string()))?;
        parse_hourly(&body, &query.field)
    }
}

impl WeatherFetcher for OpenMeteoClient {
    /// Fetch with retry and exponential backoff. Only `FetchFailed` is retried.
    async fn fetch_hourly(&self, query: &SeriesQuery) -> Result<HourlySeries, FetchError> {
        let max_tries = self.config.max_tries.max(1);
        let mut backoff = self.config.retry_backoff;
        let mut attempt = 1;
        loop {
            match self.fetch_once(query).await {
                Ok(series) => return Ok(series),
                Err(e @ FetchError::MalformedResponse(_)) => return Err(e),
                Err(e) if attempt >= max_tries => {
                    warn!(
                        "All {} attempts failed for {} at ({}, {}): {}",
                        max_tries, query.field, query.latitude, query.longitude, e
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!("Attempt {}/{}: {}", attempt, max_tries, e);
                    info!(
                        "Sleeping for {} milliseconds before retry",
                        backoff.as_millis()
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
            }
        }
    }
}
