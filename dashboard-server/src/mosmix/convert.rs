//! Conversion from Bright Sky DTOs to forecast records.

use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::domain::Parameter;

use super::types::{SourceItem, WeatherItem};

/// A MOSMIX forecast station.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStation {
    /// DWD station id.
    pub id: String,
    pub name: String,
    /// Distance to the queried point in kilometres.
    pub distance_km: f64,
}

/// One forecast value as delivered, in SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    pub station_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub parameter: Parameter,
    pub value: f64,
}

/// The closest forecast source, if any.
pub fn nearest_forecast_station(sources: &[SourceItem]) -> Option<ForecastStation> {
    sources
        .iter()
        .filter(|s| s.is_forecast())
        .filter_map(|s| {
            let id = s.dwd_station_id.clone()?;
            Some(ForecastStation {
                name: s.station_name.clone().unwrap_or_else(|| id.clone()),
                id,
                distance_km: s.distance.unwrap_or(f64::INFINITY) / 1000.0,
            })
        })
        .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
}

/// Flatten hourly records into one value per parameter.
///
/// Records with an unparseable timestamp are skipped; missing values are
/// left out rather than reported as zero.
pub fn forecast_values(
    items: &[WeatherItem],
    station_id: &str,
    parameters: &[Parameter],
) -> Vec<RawForecast> {
    let mut out = Vec::with_capacity(items.len() * parameters.len());
    for item in items {
        let timestamp = match DateTime::parse_from_rfc3339(&item.timestamp) {
            Ok(t) => t,
            Err(e) => {
                warn!(station_id, timestamp = %item.timestamp, error = %e, "skipping forecast record");
                continue;
            }
        };
        for &parameter in parameters {
            if let Some(value) = item.value(parameter) {
                out.push(RawForecast {
                    station_id: station_id.to_string(),
                    timestamp,
                    parameter,
                    value,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: Option<&str>, kind: &str, distance: f64) -> SourceItem {
        SourceItem {
            id: 0,
            dwd_station_id: id.map(str::to_string),
            station_name: id.map(|id| format!("STATION {id}")),
            observation_type: kind.to_string(),
            distance: Some(distance),
        }
    }

    fn item(timestamp: &str, temperature: Option<f64>) -> WeatherItem {
        WeatherItem {
            timestamp: timestamp.to_string(),
            temperature,
            wind_speed: Some(2.0),
            sunshine: None,
            precipitation: None,
            relative_humidity: None,
        }
    }

    #[test]
    fn nearest_ignores_observations() {
        let sources = vec![
            source(Some("A"), "synop", 100.0),
            source(Some("B"), "forecast", 30_000.0),
            source(Some("C"), "forecast", 8_000.0),
            source(None, "forecast", 10.0),
        ];

        let nearest = nearest_forecast_station(&sources).unwrap();
        assert_eq!(nearest.id, "C");
        assert_eq!(nearest.name, "STATION C");
        assert!((nearest.distance_km - 8.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_of_nothing() {
        assert!(nearest_forecast_station(&[]).is_none());
        assert!(nearest_forecast_station(&[source(Some("A"), "current", 1.0)]).is_none());
    }

    #[test]
    fn values_skip_missing_and_invalid() {
        let items = vec![
            item("2024-03-15T10:00:00+00:00", Some(280.0)),
            item("yesterday", Some(280.0)),
            item("2024-03-15T11:00:00+00:00", None),
        ];

        let values = forecast_values(
            &items,
            "10385",
            &[Parameter::Temperature, Parameter::WindSpeed],
        );

        let summary: Vec<_> = values
            .iter()
            .map(|v| (v.timestamp.format("%H").to_string(), v.parameter, v.value))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("10".to_string(), Parameter::Temperature, 280.0),
                ("10".to_string(), Parameter::WindSpeed, 2.0),
                ("11".to_string(), Parameter::WindSpeed, 2.0),
            ]
        );
        assert!(values.iter().all(|v| v.station_id == "10385"));
    }
}
