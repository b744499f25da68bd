//! Bright Sky response DTOs.
//!
//! With `units=si` temperatures arrive in Kelvin, wind speed in m/s,
//! sunshine in seconds per hour and precipitation in kg/m².

use serde::Deserialize;

use crate::domain::Parameter;

/// `/sources` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesResponse {
    pub sources: Vec<SourceItem>,
}

/// A station that delivers observations or forecasts.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceItem {
    pub id: i64,

    /// DWD station id, e.g. `"10385"`.
    pub dwd_station_id: Option<String>,

    pub station_name: Option<String>,

    /// `"forecast"` for MOSMIX sources.
    pub observation_type: String,

    /// Distance to the queried point in metres.
    pub distance: Option<f64>,
}

impl SourceItem {
    pub fn is_forecast(&self) -> bool {
        self.observation_type == "forecast"
    }
}

/// `/weather` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherResponse {
    pub weather: Vec<WeatherItem>,
}

/// One hourly record.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherItem {
    /// ISO 8601 with offset.
    pub timestamp: String,
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub sunshine: Option<f64>,
    pub precipitation: Option<f64>,
    pub relative_humidity: Option<f64>,
}

impl WeatherItem {
    /// The value of a charted parameter, if reported.
    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::WindSpeed => self.wind_speed,
            Parameter::SunshineDuration => self.sunshine,
            Parameter::Precipitation => self.precipitation,
            Parameter::Humidity => self.relative_humidity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sources() {
        let json = r#"{"sources": [
            {"id": 1, "dwd_station_id": "10385", "station_name": "BERLIN-SCHOENEFELD",
             "observation_type": "forecast", "lat": 52.38, "lon": 13.53, "distance": 12000.5,
             "wmo_station_id": "10385"},
            {"id": 2, "dwd_station_id": null, "observation_type": "synop", "distance": 900}
        ]}"#;

        let response: SourcesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.sources.len(), 2);
        assert!(response.sources[0].is_forecast());
        assert_eq!(response.sources[0].dwd_station_id.as_deref(), Some("10385"));
        assert!(!response.sources[1].is_forecast());
        assert!(response.sources[1].station_name.is_none());
    }

    #[test]
    fn parse_weather() {
        let json = r#"{"weather": [
            {"timestamp": "2024-03-15T10:00:00+00:00", "source_id": 1,
             "temperature": 283.15, "wind_speed": 4.2, "sunshine": 1800,
             "precipitation": 0.0, "relative_humidity": 71, "condition": "dry"},
            {"timestamp": "2024-03-15T11:00:00+00:00", "temperature": null}
        ], "sources": []}"#;

        let response: WeatherResponse = serde_json::from_str(json).unwrap();
        let first = &response.weather[0];
        assert_eq!(first.value(Parameter::Temperature), Some(283.15));
        assert_eq!(first.value(Parameter::SunshineDuration), Some(1800.0));
        assert_eq!(first.value(Parameter::Humidity), Some(71.0));
        assert_eq!(response.weather[1].value(Parameter::WindSpeed), None);
    }
}
