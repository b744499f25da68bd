//! Conversion from HAFAS DTOs to board departures.

use chrono::{DateTime, Duration, FixedOffset};
use tracing::warn;

use crate::domain::StationId;

use super::types::{DepartureItem, LocationItem, TripItem};

/// Error during DTO conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a timestamp
    #[error("invalid timestamp: {0}")]
    InvalidTime(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// A departure as reported by the backend, before any normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardDeparture {
    /// Stop the departure leaves from.
    pub station_id: StationId,
    pub trip_id: String,
    pub cancelled: bool,
    /// Scheduled departure with the backend's offset.
    pub scheduled: DateTime<FixedOffset>,
    /// `None` when the backend has no realtime data.
    pub delay: Option<Duration>,
    pub direction: String,
    pub line: String,
    /// Realtime platform, or the planned one if no realtime value exists.
    pub platform: Option<String>,
}

/// Convert a departure board, skipping entries that cannot be parsed.
pub fn convert_departures(items: &[DepartureItem], queried: &StationId) -> Vec<BoardDeparture> {
    items
        .iter()
        .filter_map(|item| match convert_departure(item, queried) {
            Ok(dep) => Some(dep),
            Err(e) => {
                warn!(trip_id = %item.trip_id, error = %e, "skipping departure");
                None
            }
        })
        .collect()
}

/// Convert a single board entry.
pub fn convert_departure(
    item: &DepartureItem,
    queried: &StationId,
) -> Result<BoardDeparture, ConversionError> {
    let scheduled = item
        .planned_when
        .as_deref()
        .or(item.when.as_deref())
        .ok_or(ConversionError::MissingField("plannedWhen"))?;
    let scheduled = DateTime::parse_from_rfc3339(scheduled)
        .map_err(|_| ConversionError::InvalidTime(scheduled.to_string()))?;

    let station_id = item
        .stop
        .as_ref()
        .map(|s| StationId::new(s.id.clone()))
        .unwrap_or_else(|| queried.clone());

    let line = item
        .line
        .as_ref()
        .and_then(|l| l.name.clone())
        .unwrap_or_default();

    let platform = item
        .platform
        .clone()
        .or_else(|| item.planned_platform.clone());

    Ok(BoardDeparture {
        station_id,
        trip_id: item.trip_id.clone(),
        cancelled: item.cancelled.unwrap_or(false),
        scheduled,
        delay: item.delay.map(Duration::seconds),
        direction: item.direction.clone().unwrap_or_default(),
        line,
        platform,
    })
}

/// Stop ids of a trip in travel order.
pub fn trip_stop_ids(trip: &TripItem) -> Vec<StationId> {
    trip.stopovers
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(|s| StationId::new(s.stop.id.clone()))
        .collect()
}

/// `(name, id)` pairs of the stations in a location search response.
pub fn station_matches(items: &[LocationItem]) -> Vec<(String, StationId)> {
    items
        .iter()
        .filter(|item| item.is_station())
        .filter_map(|item| Some((item.name.clone()?, StationId::new(item.id.clone()?))))
        .collect()
}
