//! HAFAS client error types.

use crate::retry::Transient;

/// Errors from the HAFAS REST client.
#[derive(Debug, thiserror::Error)]
pub enum HafasError {
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

    /// Trip or stop unknown to the backend
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the API
    #[error("rate limited by HAFAS endpoint")]
    RateLimited,

    /// Client could not be configured
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Transient for HafasError {
    fn is_transient(&self) -> bool {
        match self {
            HafasError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            HafasError::Api { status, .. } => *status >= 500,
            HafasError::RateLimited => true,
            HafasError::Json { .. } | HafasError::NotFound(_) | HafasError::Config(_) => false,
        }
    }
}
