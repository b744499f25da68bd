//! Local time zone handling.
//!
//! Backends report zoned timestamps (HAFAS with an explicit offset, the
//! forecast service in UTC). The dashboard shows plain wall-clock times
//! in one configured zone, so every timestamp is converted once and the
//! offset dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Zone used when `TZ` is unset or not an IANA zone name.
pub const DEFAULT_ZONE: Tz = chrono_tz::Europe::Berlin;

/// The configured local time zone.
///
/// # Examples
///
/// ```
/// use dashboard_server::domain::LocalZone;
///
/// assert_eq!(LocalZone::resolve(Some("Europe/London")).name(), "Europe/London");
/// assert_eq!(LocalZone::resolve(Some("not a zone")).name(), "Europe/Berlin");
/// assert_eq!(LocalZone::resolve(None).name(), "Europe/Berlin");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalZone(Tz);

impl LocalZone {
    /// Resolve a zone name, falling back to [`DEFAULT_ZONE`].
    pub fn resolve(name: Option<&str>) -> Self {
        let tz = name
            .map(str::trim)
            .and_then(|n| n.parse::<Tz>().ok())
            .unwrap_or(DEFAULT_ZONE);
        Self(tz)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Convert a zoned timestamp to local wall-clock time without offset.
    pub fn to_local<Z: TimeZone>(&self, t: &DateTime<Z>) -> NaiveDateTime {
        t.with_timezone(&self.0).naive_local()
    }

    /// Current local wall-clock time.
    pub fn now(&self) -> NaiveDateTime {
        self.to_local(&Utc::now())
    }

    /// Current local date.
    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

impl Default for LocalZone {
    fn default() -> Self {
        Self(DEFAULT_ZONE)
    }
}
