//! Departure table view model.
//!
//! Turns normalized departures into rows ready for the template: the
//! departure time with its delay suffix, a delay class for colouring and
//! a shading flag that alternates between direction groups.

use chrono::{Duration, NaiveDateTime};

use crate::domain::short_name;

use super::board::Departure;

/// Colour class of a departure time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayClass {
    OnTime,
    Late,
    Early,
}

impl DelayClass {
    pub fn from_minutes(minutes: i64) -> Self {
        match minutes {
            0 => DelayClass::OnTime,
            m if m > 0 => DelayClass::Late,
            _ => DelayClass::Early,
        }
    }

    /// CSS class used by the stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            DelayClass::OnTime => "on-time",
            DelayClass::Late => "late",
            DelayClass::Early => "early",
        }
    }
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureRow {
    /// `"HH:MM"` or `"HH:MM (+N)"`.
    pub departure: String,
    pub line: String,
    pub direction: String,
    pub platform: String,
    pub delay_class: DelayClass,
    /// Every other direction group is shaded.
    pub shaded: bool,
}

/// A station's departure table.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureTable {
    /// Full station name.
    pub name: String,
    /// Heading shown above the table.
    pub title: String,
    pub rows: Vec<DepartureRow>,
}

/// Delay rounded to whole minutes.
pub fn delay_minutes(delay: Duration) -> i64 {
    (delay.num_seconds() as f64 / 60.0).round() as i64
}

/// Format the scheduled time with a signed delay suffix.
///
/// ```
/// use chrono::{Duration, NaiveDate};
/// use dashboard_server::transit::format_departure;
///
/// let t = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// assert_eq!(format_departure(t, Duration::zero()), "10:00");
/// assert_eq!(format_departure(t, Duration::minutes(2)), "10:00 (+2)");
/// assert_eq!(format_departure(t, Duration::minutes(-1)), "10:00 (-1)");
/// ```
pub fn format_departure(scheduled: NaiveDateTime, delay: Duration) -> String {
    let time = scheduled.format("%H:%M");
    match delay_minutes(delay) {
        0 => time.to_string(),
        minutes => format!("{time} ({minutes:+})"),
    }
}

/// Build the table for a station's departures.
pub fn to_table(name: &str, departures: &[Departure]) -> DepartureTable {
    let mut groups: Vec<&str> = Vec::new();
    for dep in departures {
        if !groups.contains(&dep.platform_direction.as_str()) {
            groups.push(&dep.platform_direction);
        }
    }
    let striped = groups.len() > 1;

    let rows = departures
        .iter()
        .map(|dep| {
            let group = groups
                .iter()
                .position(|g| *g == dep.platform_direction)
                .unwrap_or(0);
            DepartureRow {
                departure: format_departure(dep.scheduled, dep.delay),
                line: dep.line.trim().to_string(),
                direction: dep.direction.trim().to_string(),
                platform: dep.platform.as_deref().unwrap_or("").trim().to_string(),
                delay_class: DelayClass::from_minutes(delay_minutes(dep.delay)),
                shaded: striped && group % 2 == 0,
            }
        })
        .collect();

    DepartureTable {
        name: name.to_string(),
        title: short_name(name).to_string(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;
    use chrono::NaiveDate;

    fn dep(key: &str, minute: u32, delay_secs: i64, line: &str) -> Departure {
        let scheduled = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap();
        let delay = Duration::seconds(delay_secs);
        Departure {
            station_id: StationId::new("S"),
            trip_id: "t".to_string(),
            cancelled: false,
            scheduled,
            delay,
            direction: " Erkner ".to_string(),
            line: line.to_string(),
            platform: Some(" 2 ".to_string()),
            platform_direction: key.to_string(),
            actual_departure: scheduled + delay,
        }
    }

    #[test]
    fn delay_rounds_to_minutes() {
        assert_eq!(delay_minutes(Duration::seconds(89)), 1);
        assert_eq!(delay_minutes(Duration::seconds(90)), 2);
        assert_eq!(delay_minutes(Duration::seconds(-60)), -1);
        assert_eq!(delay_minutes(Duration::seconds(20)), 0);
    }

    #[test]
    fn delay_classes() {
        assert_eq!(DelayClass::from_minutes(0), DelayClass::OnTime);
        assert_eq!(DelayClass::from_minutes(3), DelayClass::Late);
        assert_eq!(DelayClass::from_minutes(-2), DelayClass::Early);
        assert_eq!(DelayClass::Late.css_class(), "late");
    }

    #[test]
    fn rows_are_trimmed_and_formatted() {
        let table = to_table("S+U Alexanderplatz, Berlin", &[dep("A", 5, 120, " S3 ")]);

        assert_eq!(table.title, "S+U Alexanderplatz");
        let row = &table.rows[0];
        assert_eq!(row.departure, "10:05 (+2)");
        assert_eq!(row.line, "S3");
        assert_eq!(row.direction, "Erkner");
        assert_eq!(row.platform, "2");
        assert_eq!(row.delay_class, DelayClass::Late);
        assert!(!row.shaded, "a single group is never shaded");
    }

    #[test]
    fn alternate_groups_are_shaded() {
        let departures = vec![
            dep("A", 0, 0, "S1"),
            dep("A", 10, 0, "S1"),
            dep("B", 5, 0, "S1"),
            dep("C", 7, 0, "S1"),
        ];

        let shaded: Vec<bool> = to_table("X", &departures)
            .rows
            .iter()
            .map(|r| r.shaded)
            .collect();

        assert_eq!(shaded, vec![true, true, false, true]);
    }
}
