//! Place name → coordinate resolution for the weather panel.
//!
//! HERE is used when an API key is configured. Without a key the
//! geocoder falls back to Nominatim.

mod error;
mod here;
mod transport;
mod nominatim;

use async_trait::async_trait;
use tracing::info;

use crate::domain::Coordinates;
use crate::locations::LocationSource;
use crate::retry::RetryPolicy;

pub use error::GeocodeError;
pub use here::{HereClient, HereResponse, here_matches};
pub use nominatim::{NominatimClient, NominatimPlace, nominatim_matches};

use transport::JsonClient;

const DEFAULT_HERE_URL: &str = "https://geocode.search.hereapi.com/v1/geocode";
const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Configuration for the geocoders.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// HERE geocode endpoint
    pub here_url: String,
    /// Nominatim search endpoint
    pub nominatim_url: String,
    /// User agent sent with every request; Nominatim rejects generic ones
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl GeocodeConfig {
    pub fn new() -> Self {
        Self {
            here_url: DEFAULT_HERE_URL.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: concat!(
                "dashboard-server/",
                env!("CARGO_PKG_VERSION"),
                " (transit and weather dashboard)"
            )
            .to_string(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_here_url(mut self, url: impl Into<String>) -> Self {
        self.here_url = url.into();
        self
    }

    pub fn with_nominatim_url(mut self, url: impl Into<String>) -> Self {
        self.nominatim_url = url.into();
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

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The geocoder in use.
#[derive(Debug, Clone)]
pub enum Geocoder {
    Here(HereClient),
    Nominatim(NominatimClient),
}

impl Geocoder {
    /// HERE when `here_key` is non-blank, otherwise Nominatim.
    pub fn select(here_key: Option<&str>, config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        match here_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => {
                let http = JsonClient::new(
                    &config.user_agent,
                    config.timeout_secs,
                    4,
                    config.retry.clone(),
                )?;
                let client = HereClient::new(http, &config.here_url, key.to_string())?;
                Ok(Geocoder::Here(client))
            }
            None => {
                info!("no HERE API key configured, geocoding with Nominatim");
                let http = JsonClient::new(
                    &config.user_agent,
                    config.timeout_secs,
                    1,
                    config.retry.clone(),
                )?;
                let client = NominatimClient::new(http, &config.nominatim_url)?;
                Ok(Geocoder::Nominatim(client))
            }
        }
    }

    /// Short backend name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Geocoder::Here(_) => "here",
            Geocoder::Nominatim(_) => "nominatim",
        }
    }

    pub async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, Coordinates)>, GeocodeError> {
        match self {
            Geocoder::Here(client) => client.geocode(query, limit).await,
            Geocoder::Nominatim(client) => client.geocode(query, limit).await,
        }
    }
}

#[async_trait]
impl LocationSource for Geocoder {
    type Location = Coordinates;
    type Error = GeocodeError;

    async fn lookup(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, Coordinates)>, GeocodeError> {
        self.geocode(query, limit).await
    }
}
