//! HAFAS REST HTTP client.
//!
//! Talks to a db-rest style HAFAS proxy: location search, station
//! departure boards and trip details. Requests are limited by a
//! semaphore and transient failures are retried with backoff.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Product, StationId};
use crate::retry::RetryPolicy;

use super::convert::{BoardDeparture, convert_departures, station_matches, trip_stop_ids};
use super::error::HafasError;
use super::types::{DeparturesResponse, LocationItem, TripResponse};

/// Default base URL (public DB HAFAS proxy).
const DEFAULT_BASE_URL: &str = "https://v6.db.transport.rest";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// How many candidates a location search asks for at least.
///
/// The location cache ranks exact matches first and truncates afterwards,
/// so asking for a few more than displayed keeps the exact match in reach.
const MIN_LOCATION_RESULTS: usize = 10;

/// Configuration for the HAFAS client.
#[derive(Debug, Clone)]
pub struct HafasConfig {
    /// Base URL for the API
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl HafasConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("dashboard-server/", env!("CARGO_PKG_VERSION")).to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }

    /// Set a custom base URL (for testing or a self-hosted proxy).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for HafasConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HAFAS REST API client.
#[derive(Debug, Clone)]
pub struct HafasClient {
    http: reqwest::Client,
    base_url: Url,
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl HafasClient {
    /// Create a new client with the given configuration.
    pub fn new(config: HafasConfig) -> Result<Self, HafasError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| HafasError::Config(format!("invalid base URL {}: {e}", config.base_url)))?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            retry: config.retry,
        })
    }

    /// Search stations by name.
    ///
    /// Returns `(display name, station id)` pairs in backend order.
    pub async fn locations(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, StationId)>, HafasError> {
        let url = self.endpoint(&["locations"])?;
        let results = limit.max(MIN_LOCATION_RESULTS);

        let items: Vec<LocationItem> = self
            .get_json(
                url,
                vec![
                    ("query", query.to_string()),
                    ("results", results.to_string()),
                    ("stops", "true".to_string()),
                    ("addresses", "false".to_string()),
                    ("poi", "false".to_string()),
                ],
            )
            .await?;

        Ok(station_matches(&items))
    }

    /// Departure board of a station.
    ///
    /// # Arguments
    ///
    /// * `station` - Station to query
    /// * `when` - Start of the time window
    /// * `duration_mins` - Length of the time window; the number of
    ///   results is not capped
    /// * `products` - Enabled products; all others are disabled
    pub async fn departures(
        &self,
        station: &StationId,
        when: DateTime<Utc>,
        duration_mins: u32,
        products: &BTreeSet<Product>,
    ) -> Result<Vec<BoardDeparture>, HafasError> {
        let url = self.endpoint(&["stops", station.as_str(), "departures"])?;

        let mut query = vec![
            ("when", when.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("duration", duration_mins.to_string()),
            ("remarks", "false".to_string()),
        ];
        for product in Product::ALL {
            query.push((product.token(), products.contains(&product).to_string()));
        }

        let response: DeparturesResponse = self.get_json(url, query).await?;
        let departures = convert_departures(&response.into_departures(), station);

        debug!(station = %station, count = departures.len(), "fetched departures");
        Ok(departures)
    }

    /// Stop ids of a trip in travel order.
    pub async fn trip_stops(&self, trip_id: &str) -> Result<Vec<StationId>, HafasError> {
        let url = self.endpoint(&["trips", trip_id])?;

        let response: TripResponse = self
            .get_json(
                url,
                vec![
                    ("stopovers", "true".to_string()),
                    ("remarks", "false".to_string()),
                    ("polyline", "false".to_string()),
                ],
            )
            .await?;

        Ok(trip_stop_ids(&response.trip))
    }

    /// Build an endpoint URL; a `/` inside a segment is escaped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, HafasError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HafasError::Config(format!("base URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: Vec<(&'static str, String)>,
    ) -> Result<T, HafasError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| HafasError::Config("semaphore closed".to_string()))?;

        let operation = url.path().to_string();
        let query = &query;
        self.retry
            .run(&operation, move || self.get_json_once(url.clone(), query))
            .await
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T, HafasError> {
        let path = url.path().to_string();
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(HafasError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HafasError::NotFound(path));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HafasError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| HafasError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = HafasConfig::new()
            .with_base_url("http://localhost:3000")
            .with_max_concurrent(10)
            .with_timeout(60)
            .with_retry(RetryPolicy::none());

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn config_defaults() {
        let config = HafasConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("dashboard-server/"));
    }

    #[test]
    fn client_rejects_invalid_base_url() {
        let config = HafasConfig::new().with_base_url("not a url");
        assert!(matches!(HafasClient::new(config), Err(HafasError::Config(_))));
    }

    #[test]
    fn endpoint_appends_segments() {
        let client = HafasClient::new(HafasConfig::new().with_base_url("http://localhost:3000/"))
            .unwrap();

        let url = client.endpoint(&["trips", "1|2345|0|80|15032024"]).unwrap();
        assert!(url.as_str().starts_with("http://localhost:3000/trips/1"));
        assert_eq!(url.path_segments().unwrap().count(), 2);

        let url = client.endpoint(&["trips", "a/b"]).unwrap();
        assert_eq!(url.path_segments().unwrap().count(), 2);

        let url = client.endpoint(&["stops", "900100003", "departures"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/stops/900100003/departures");
    }
}
