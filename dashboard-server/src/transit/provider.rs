//! Transit provider: stations, departures and direction memo.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use moka::future::Cache as MokaCache;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{Category, LocalZone, StationId, product_filter};
use crate::hafas::{BoardDeparture, HafasError};
use crate::locations::{LocationCache, LocationProvider};

use super::backend::TransitBackend;
use super::board::{Departure, explicit_platform, group_and_truncate, line_direction, next_stop_after};

/// Default length of the departure window.
pub const DEFAULT_MAX_DURATION_MINS: u32 = 120;

/// Memo key: (station, `"{line}_{direction}"`).
type DirectionKey = (StationId, String);

/// Errors from the transit provider.
#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    /// The station was never resolved through search or reconcile
    #[error("unknown station: {0}")]
    UnknownLocation(String),

    /// Backend request failed
    #[error(transparent)]
    Backend(#[from] HafasError),

    /// The window start does not fit the calendar
    #[error("offset of {0} minutes is out of range")]
    InvalidOffset(i64),

    /// Trip lookup for direction disambiguation failed
    #[error("direction lookup failed: {0}")]
    DirectionLookup(#[source] Arc<HafasError>),
}

/// Configuration for the transit provider.
#[derive(Debug, Clone)]
pub struct TransitConfig {
    /// Maximum number of memoized (station, line direction) entries.
    pub memo_capacity: u64,

    /// How long an idle per-station fetch lock is kept.
    pub lock_idle: StdDuration,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            memo_capacity: 10_000,
            lock_idle: StdDuration::from_secs(600),
        }
    }
}

/// Parameters of a departure fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRequest {
    /// Cached station display name.
    pub name: String,
    /// Enabled categories; empty means all.
    pub categories: Vec<Category>,
    /// Total rows to show across all direction groups.
    pub row_limit: usize,
    /// Minutes from now where the window starts.
    pub offset_minutes: i64,
    /// Length of the window in minutes.
    pub max_duration_minutes: u32,
}

impl DepartureRequest {
    pub fn new(
        name: impl Into<String>,
        categories: Vec<Category>,
        row_limit: usize,
        offset_minutes: i64,
    ) -> Self {
        Self {
            name: name.into(),
            categories,
            row_limit,
            offset_minutes,
            max_duration_minutes: DEFAULT_MAX_DURATION_MINS,
        }
    }

    pub fn with_max_duration(mut self, minutes: u32) -> Self {
        self.max_duration_minutes = minutes;
        self
    }
}

/// Departures for user-selected stations.
///
/// Owns the station cache and the direction memo. Fetches for the same
/// station are serialized; different stations may be fetched concurrently.
pub struct TransitProvider<B: TransitBackend> {
    backend: Arc<B>,
    stations: LocationCache<Arc<B>>,
    /// (station, line direction) → next stop id.
    directions: MokaCache<DirectionKey, String>,
    /// Per-station fetch locks.
    in_flight: MokaCache<String, Arc<Mutex<()>>>,
    zone: LocalZone,
}

impl<B: TransitBackend + 'static> TransitProvider<B> {
    pub fn new(backend: B, zone: LocalZone, config: &TransitConfig) -> Self {
        let backend = Arc::new(backend);

        let directions = MokaCache::builder()
            .max_capacity(config.memo_capacity)
            .build();

        let in_flight = MokaCache::builder()
            .time_to_idle(config.lock_idle)
            .build();

        Self {
            stations: LocationCache::new(backend.clone()),
            backend,
            directions,
            in_flight,
            zone,
        }
    }

    /// The station cache.
    pub fn stations(&self) -> &LocationCache<Arc<B>> {
        &self.stations
    }

    /// Upcoming departures for a cached station.
    ///
    /// Cancelled departures are dropped, the rest are normalized to local
    /// time, keyed by platform or next stop, and trimmed so every direction
    /// group gets an equal share of `row_limit`.
    pub async fn departures(&self, request: &DepartureRequest) -> Result<Vec<Departure>, TransitError> {
        let station = self
            .stations
            .get(&request.name)
            .await
            .ok_or_else(|| TransitError::UnknownLocation(request.name.clone()))?;

        let lock = self
            .in_flight
            .get_with(request.name.clone(), async { Arc::new(Mutex::new(())) })
            .await;
        let _guard = lock.lock().await;

        let when = Duration::try_minutes(request.offset_minutes)
            .and_then(|offset| Utc::now().checked_add_signed(offset))
            .ok_or(TransitError::InvalidOffset(request.offset_minutes))?;

        let products = product_filter(&request.categories);

        debug!(station = %request.name, ?products, "fetching departures");
        let board = self
            .backend
            .departures(&station, when, request.max_duration_minutes, &products)
            .await?;

        let mut departures = Vec::with_capacity(board.len());
        for raw in board.into_iter().filter(|d| !d.cancelled) {
            let key = self.disambiguation_key(&raw).await?;
            departures.push(Departure::from_board(raw, key, &self.zone));
        }

        let departures = group_and_truncate(departures, request.row_limit);
        info!(station = %request.name, rows = departures.len(), "departures updated");
        Ok(departures)
    }

    /// Platform if known, otherwise the memoized next stop of the line.
    async fn disambiguation_key(&self, raw: &BoardDeparture) -> Result<String, TransitError> {
        if let Some(platform) = explicit_platform(raw.platform.as_deref()) {
            return Ok(platform.to_string());
        }

        let key = (
            raw.station_id.clone(),
            line_direction(&raw.line, &raw.direction),
        );
        let backend = self.backend.clone();
        let trip_id = raw.trip_id.clone();
        let station = raw.station_id.clone();

        self.directions
            .try_get_with(key, async move {
                let stops = backend.trip_stops(&trip_id).await?;
                Ok::<_, HafasError>(next_stop_after(&stops, &station))
            })
            .await
            .map_err(TransitError::DirectionLookup)
    }
}

#[async_trait]
impl<B: TransitBackend + 'static> LocationProvider for TransitProvider<B> {
    type Request = DepartureRequest;
    type Output = Vec<Departure>;
    type Error = TransitError;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, TransitError> {
        Ok(self.stations.search(query, limit).await?)
    }

    async fn reconcile(&self, names: &[String]) -> Result<(), TransitError> {
        Ok(self.stations.reconcile(names).await?)
    }

    async fn resolve_missing(&self, names: &[String]) -> Result<(), TransitError> {
        Ok(self.stations.resolve_missing(names).await?)
    }

    async fn fetch(&self, request: DepartureRequest) -> Result<Vec<Departure>, TransitError> {
        self.departures(&request).await
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
