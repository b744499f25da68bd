//! Bright Sky HTTP client for DWD MOSMIX forecasts.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Coordinates, Parameter};
use crate::retry::RetryPolicy;

use super::convert::{ForecastStation, RawForecast, forecast_values, nearest_forecast_station};
use super::error::ForecastError;
use super::types::{SourcesResponse, WeatherResponse};

/// Default base URL (public Bright Sky instance).
const DEFAULT_BASE_URL: &str = "https://api.brightsky.dev";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// MOSMIX runs roughly ten days ahead.
const DEFAULT_HORIZON_DAYS: u64 = 10;

/// Configuration for the forecast client.
#[derive(Debug, Clone)]
pub struct MosmixConfig {
    /// Base URL for the API
    pub base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Days of forecast requested per station
    pub horizon_days: u64,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl MosmixConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("dashboard-server/", env!("CARGO_PKG_VERSION")).to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            horizon_days: DEFAULT_HORIZON_DAYS,
            retry: RetryPolicy::default(),
        }
    }

    /// Set a custom base URL (for testing or a self-hosted instance).
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

    pub fn with_horizon(mut self, days: u64) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for MosmixConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bright Sky API client.
#[derive(Debug, Clone)]
pub struct MosmixClient {
    http: reqwest::Client,
    base_url: Url,
    semaphore: Arc<Semaphore>,
    horizon_days: u64,
    retry: RetryPolicy,
}

impl MosmixClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MosmixConfig) -> Result<Self, ForecastError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ForecastError::Config(format!("invalid base URL {}: {e}", config.base_url))
        })?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            horizon_days: config.horizon_days,
            retry: config.retry,
        })
    }

    /// The closest MOSMIX station within `radius_km`, if any.
    pub async fn nearest_station(
        &self,
        at: Coordinates,
        radius_km: f64,
    ) -> Result<Option<ForecastStation>, ForecastError> {
        let url = self.endpoint("sources")?;
        let max_dist = (radius_km * 1000.0).round() as u64;

        let response: SourcesResponse = match self
            .get_json(
                url,
                vec![
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("max_dist", max_dist.to_string()),
                ],
            )
            .await
        {
            Ok(response) => response,
            // Bright Sky answers 404 when nothing lies within max_dist
            Err(ForecastError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(nearest_forecast_station(&response.sources))
    }

    /// Forecast series of one station from `from` over the configured horizon.
    pub async fn station_forecast(
        &self,
        station_id: &str,
        from: NaiveDate,
        parameters: &[Parameter],
    ) -> Result<Vec<RawForecast>, ForecastError> {
        let url = self.endpoint("weather")?;
        let last = from
            .checked_add_days(Days::new(self.horizon_days))
            .unwrap_or(NaiveDate::MAX);

        let response: WeatherResponse = self
            .get_json(
                url,
                vec![
                    ("dwd_station_id", station_id.to_string()),
                    ("date", from.format("%Y-%m-%d").to_string()),
                    ("last_date", last.format("%Y-%m-%d").to_string()),
                    ("units", "si".to_string()),
                ],
            )
            .await?;

        let values = forecast_values(&response.weather, station_id, parameters);
        debug!(station_id, count = values.len(), "fetched forecast");
        Ok(values)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ForecastError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ForecastError::Config(format!("base URL {} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: Vec<(&'static str, String)>,
    ) -> Result<T, ForecastError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ForecastError::Config("semaphore closed".to_string()))?;

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
    ) -> Result<T, ForecastError> {
        let path = url.path().to_string();
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ForecastError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ForecastError::NotFound(path));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| ForecastError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}
