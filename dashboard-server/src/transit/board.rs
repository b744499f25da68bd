//! Departure normalization and direction grouping.
//!
//! Boards without platform information mix both directions of a line.
//! Each departure therefore gets a disambiguation key: the platform if
//! the backend reports one, otherwise the id of the next stop the trip
//! calls at. Departures are then grouped by key so every direction gets
//! its share of the visible rows.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

use crate::domain::{LocalZone, StationId};
use crate::hafas::BoardDeparture;

/// Key used when the next stop of a trip cannot be determined.
pub const UNKNOWN_NEXT_STOP: &str = "-1";

/// A normalized departure in local time.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub station_id: StationId,
    pub trip_id: String,
    pub cancelled: bool,
    /// Scheduled departure, local wall-clock time.
    pub scheduled: NaiveDateTime,
    /// Signed delay; zero when the backend had no realtime data.
    pub delay: Duration,
    pub direction: String,
    pub line: String,
    pub platform: Option<String>,
    /// Platform, or next stop id when no platform is known.
    pub platform_direction: String,
    /// `scheduled + delay`.
    pub actual_departure: NaiveDateTime,
}

impl Departure {
    /// Normalize a backend departure into local time.
    pub fn from_board(raw: BoardDeparture, platform_direction: String, zone: &LocalZone) -> Self {
        let scheduled = zone.to_local(&raw.scheduled);
        let delay = raw.delay.unwrap_or_else(Duration::zero);

        Self {
            station_id: raw.station_id,
            trip_id: raw.trip_id,
            cancelled: raw.cancelled,
            scheduled,
            delay,
            direction: raw.direction,
            line: raw.line,
            platform: raw.platform,
            platform_direction,
            actual_departure: scheduled + delay,
        }
    }
}

/// The platform as a disambiguation key, if one is known.
pub fn explicit_platform(platform: Option<&str>) -> Option<&str> {
    platform.map(str::trim).filter(|p| !p.is_empty())
}

/// Memo key for a line heading somewhere, e.g. `"S3_S Erkner"`.
pub fn line_direction(line: &str, direction: &str) -> String {
    format!("{line}_{direction}")
}

/// The stop following `station` on a trip.
///
/// Returns [`UNKNOWN_NEXT_STOP`] if `station` is the last stop or does
/// not occur exactly once.
pub fn next_stop_after(stops: &[StationId], station: &StationId) -> String {
    let mut positions = stops
        .iter()
        .enumerate()
        .filter(|(_, stop)| *stop == station)
        .map(|(idx, _)| idx);

    match (positions.next(), positions.next()) {
        (Some(idx), None) => stops
            .get(idx + 1)
            .map(|next| next.to_string())
            .unwrap_or_else(|| UNKNOWN_NEXT_STOP.to_string()),
        _ => UNKNOWN_NEXT_STOP.to_string(),
    }
}

/// Rows each disambiguation group may show.
pub fn rows_per_group(row_limit: usize, group_count: usize) -> usize {
    if group_count == 0 {
        return 0;
    }
    row_limit.div_ceil(group_count)
}

/// Group departures by key, keep the earliest few of each group.
///
/// Each group is sorted by actual departure time and truncated to
/// `ceil(row_limit / group_count)`. Groups are emitted ordered by their
/// earliest actual departure, ties broken by key.
pub fn group_and_truncate(departures: Vec<Departure>, row_limit: usize) -> Vec<Departure> {
    let mut groups: HashMap<String, Vec<Departure>> = HashMap::new();
    for dep in departures {
        groups
            .entry(dep.platform_direction.clone())
            .or_default()
            .push(dep);
    }

    let per_group = rows_per_group(row_limit, groups.len());

    let mut groups: Vec<(String, Vec<Departure>)> = groups
        .into_iter()
        .map(|(key, mut group)| {
            group.sort_by_key(|d| d.actual_departure);
            group.truncate(per_group);
            (key, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect();

    groups.sort_by(|(a_key, a), (b_key, b)| {
        let a_first = a.first().map(|d| d.actual_departure);
        let b_first = b.first().map(|d| d.actual_departure);
        a_first.cmp(&b_first).then_with(|| a_key.cmp(b_key))
    });

    groups.into_iter().flat_map(|(_, group)| group).collect()
}
