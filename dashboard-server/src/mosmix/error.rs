//! Forecast client error types.

use crate::retry::Transient;

/// Errors from the MOSMIX forecast client.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
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

    /// No station or record matches the query
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the API
    #[error("rate limited by forecast endpoint")]
    RateLimited,

    /// Client could not be configured
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Transient for ForecastError {
    fn is_transient(&self) -> bool {
        match self {
            ForecastError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ForecastError::Api { status, .. } => *status >= 500,
            ForecastError::RateLimited => true,
            ForecastError::Json { .. } | ForecastError::NotFound(_) | ForecastError::Config(_) => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ForecastError::RateLimited.is_transient());
        assert!(
            ForecastError::Api {
                status: 500,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !ForecastError::Api {
                status: 422,
                message: "bad date".into()
            }
            .is_transient()
        );
        assert!(!ForecastError::Config("x".into()).is_transient());
        assert!(!ForecastError::NotFound("/sources".into()).is_transient());
    }
}
