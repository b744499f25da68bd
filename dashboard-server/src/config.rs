//! Startup configuration from environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::domain::LocalZone;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8050";

/// Default location of the API key file.
pub const DEFAULT_API_KEYS_PATH: &str = "config/api_keys.json";

/// Default static asset directory.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Errors while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid listen address {value}: {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed API key file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Third-party API keys, e.g. `{"here": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub here: String,
}

impl ApiKeys {
    /// Load keys from a JSON file. A missing file yields no keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no API key file, continuing without keys");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The HERE key, if a non-blank one is configured.
    pub fn here(&self) -> Option<&str> {
        Some(self.here.trim()).filter(|k| !k.is_empty())
    }
}

/// Missed refreshes after which a location no dashboard asks for is dropped.
pub const IDLE_REFRESHES: u64 = 3;

/// Refresh intervals and form defaults handed to the dashboard page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub clock_refresh_secs: u64,
    pub transit_refresh_secs: u64,
    pub weather_refresh_secs: u64,
    /// Rows per departure table.
    pub default_rows: usize,
    /// Minutes from now where departure boards start.
    pub default_offset_minutes: i64,
    /// New matches offered per location search.
    pub suggestion_limit: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            clock_refresh_secs: 60,
            transit_refresh_secs: 60,
            weather_refresh_secs: 3600,
            default_rows: 15,
            default_offset_minutes: 5,
            suggestion_limit: 5,
        }
    }
}

impl DashboardSettings {
    /// How long a cached station survives without any board asking for it.
    pub fn transit_idle(&self) -> Duration {
        Duration::from_secs(self.transit_refresh_secs.saturating_mul(IDLE_REFRESHES))
    }

    /// How long a cached place survives without any chart asking for it.
    pub fn weather_idle(&self) -> Duration {
        Duration::from_secs(self.weather_refresh_secs.saturating_mul(IDLE_REFRESHES))
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub api_keys_path: PathBuf,
    pub static_dir: PathBuf,
    pub zone: LocalZone,
    /// Override for the HAFAS endpoint.
    pub hafas_base_url: Option<String>,
    /// Override for the forecast endpoint.
    pub mosmix_base_url: Option<String>,
    pub dashboard: DashboardSettings,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr_value = get("DASHBOARD_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr_value.clone(),
                source,
            })?;

        Ok(Self {
            addr,
            api_keys_path: get("DASHBOARD_API_KEYS")
                .unwrap_or_else(|| DEFAULT_API_KEYS_PATH.to_string())
                .into(),
            static_dir: get("DASHBOARD_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
            zone: LocalZone::resolve(get("TZ").as_deref()),
            hafas_base_url: get("HAFAS_BASE_URL"),
            mosmix_base_url: get("MOSMIX_BASE_URL"),
            dashboard: DashboardSettings::default(),
        })
    }
}
