//! Geocoding error types.

use crate::retry::Transient;

/// Errors from the geocoding backends.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the API
    #[error("rate limited by geocoder")]
    RateLimited,

    /// Client could not be configured
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Transient for GeocodeError {
    fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            GeocodeError::Api { status, .. } => *status >= 500,
            GeocodeError::RateLimited => true,
            GeocodeError::Json { .. } | GeocodeError::Config(_) => false,
        }
    }
}
