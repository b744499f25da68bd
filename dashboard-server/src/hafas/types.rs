//! HAFAS REST response DTOs.
//!
//! These map the JSON returned by db-rest style HAFAS endpoints. Fields
//! are optional wherever the backend omits them for some products or
//! for cancelled services.

use serde::Deserialize;

/// One entry of a `/locations` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationItem {
    /// `"stop"`, `"station"`, `"location"` (address) or a POI marker.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Station id; absent for addresses.
    pub id: Option<String>,

    /// Display name.
    pub name: Option<String>,
}

impl LocationItem {
    /// Whether this entry is a stop or station that has departures.
    pub fn is_station(&self) -> bool {
        matches!(self.kind.as_deref(), Some("stop" | "station"))
    }
}

/// `/stops/{id}/departures` response; newer endpoints wrap the list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeparturesResponse {
    Wrapped { departures: Vec<DepartureItem> },
    Bare(Vec<DepartureItem>),
}

impl DeparturesResponse {
    pub fn into_departures(self) -> Vec<DepartureItem> {
        match self {
            DeparturesResponse::Wrapped { departures } => departures,
            DeparturesResponse::Bare(departures) => departures,
        }
    }
}

/// A departure on a station board.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureItem {
    /// Trip id, valid for `/trips/{id}`.
    pub trip_id: String,

    /// The stop the departure leaves from (may differ from the queried
    /// station for station complexes).
    pub stop: Option<StopRef>,

    /// Realtime departure (ISO 8601 with offset); null when cancelled.
    pub when: Option<String>,

    /// Scheduled departure (ISO 8601 with offset).
    pub planned_when: Option<String>,

    /// Delay in seconds; null when no realtime data is available.
    pub delay: Option<i64>,

    /// Realtime platform.
    pub platform: Option<String>,

    /// Scheduled platform.
    pub planned_platform: Option<String>,

    /// Headsign.
    pub direction: Option<String>,

    pub line: Option<LineRef>,

    /// Present and true for cancelled departures.
    pub cancelled: Option<bool>,
}

/// A stop reference embedded in departures and trips.
#[derive(Debug, Clone, Deserialize)]
pub struct StopRef {
    pub id: String,
    pub name: Option<String>,
}

/// Line information of a departure.
#[derive(Debug, Clone, Deserialize)]
pub struct LineRef {
    /// Display name, e.g. `"S 5"` or `"Bus 100"`.
    pub name: Option<String>,

    /// Product token, e.g. `"suburban"`.
    pub product: Option<String>,
}

/// `/trips/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TripResponse {
    pub trip: TripItem,
}

/// A trip with its stopovers in travel order.
#[derive(Debug, Clone, Deserialize)]
pub struct TripItem {
    pub id: String,
    pub stopovers: Option<Vec<Stopover>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stopover {
    pub stop: StopRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wrapped_departures() {
        let json = r#"{
            "departures": [{
                "tripId": "1|2345|0|80|15032024",
                "stop": {"type": "stop", "id": "900100003", "name": "S+U Alexanderplatz"},
                "when": "2024-03-15T10:02:00+01:00",
                "plannedWhen": "2024-03-15T10:00:00+01:00",
                "delay": 120,
                "platform": "2",
                "plannedPlatform": "2",
                "direction": "S Erkner",
                "line": {"type": "line", "name": "S3", "product": "suburban"}
            }],
            "realtimeDataUpdatedAt": 1710493200
        }"#;

        let response: DeparturesResponse = serde_json::from_str(json).unwrap();
        let departures = response.into_departures();

        assert_eq!(departures.len(), 1);
        let dep = &departures[0];
        assert_eq!(dep.trip_id, "1|2345|0|80|15032024");
        assert_eq!(dep.delay, Some(120));
        assert_eq!(dep.platform.as_deref(), Some("2"));
        assert_eq!(dep.line.as_ref().unwrap().name.as_deref(), Some("S3"));
        assert_eq!(dep.cancelled, None);
    }

    #[test]
    fn parse_bare_departures_with_cancellation() {
        let json = r#"[{
            "tripId": "1|99",
            "stop": {"id": "8011160"},
            "when": null,
            "plannedWhen": "2024-03-15T10:05:00+01:00",
            "delay": null,
            "platform": null,
            "direction": "Potsdam Hbf",
            "line": {"name": "RE1"},
            "cancelled": true
        }]"#;

        let response: DeparturesResponse = serde_json::from_str(json).unwrap();
        let departures = response.into_departures();

        assert_eq!(departures[0].cancelled, Some(true));
        assert!(departures[0].when.is_none());
        assert!(departures[0].platform.is_none());
    }

    #[test]
    fn parse_trip_stopovers() {
        let json = r#"{"trip": {"id": "1|99", "stopovers": [
            {"stop": {"id": "A", "name": "First"}},
            {"stop": {"id": "B", "name": "Second"}}
        ]}}"#;

        let response: TripResponse = serde_json::from_str(json).unwrap();
        let stops: Vec<_> = response
            .trip
            .stopovers
            .unwrap()
            .into_iter()
            .map(|s| s.stop.id)
            .collect();
        assert_eq!(stops, vec!["A", "B"]);
    }

    #[test]
    fn location_kinds() {
        let json = r#"[
            {"type": "stop", "id": "900100003", "name": "S+U Alexanderplatz"},
            {"type": "location", "address": "Alexanderplatz 1", "latitude": 52.5, "longitude": 13.4}
        ]"#;

        let items: Vec<LocationItem> = serde_json::from_str(json).unwrap();
        assert!(items[0].is_station());
        assert!(!items[1].is_station());
    }
}
