//! Tests for the transit provider against an in-memory backend.

use super::*;
use crate::domain::Product;
use crate::locations::LocationSource;
use crate::transit::table::to_table;
use chrono::{DateTime, NaiveDateTime};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const STATION: &str = "900100003";

fn station() -> StationId {
    StationId::new(STATION)
}

fn board(
    line: &str,
    hhmm: &str,
    delay_mins: Option<i64>,
    cancelled: bool,
    platform: Option<&str>,
) -> BoardDeparture {
    let scheduled = DateTime::parse_from_rfc3339(&format!("2024-03-15T{hhmm}:00+01:00")).unwrap();
    BoardDeparture {
        station_id: station(),
        trip_id: format!("{line}|{hhmm}"),
        cancelled,
        scheduled,
        delay: delay_mins.map(Duration::minutes),
        direction: format!("{line} terminus"),
        line: line.to_string(),
        platform: platform.map(str::to_string),
    }
}

fn local(hhmm: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("2024-03-15 {hhmm}"), "%Y-%m-%d %H:%M").unwrap()
}

/// Mock backend serving a fixed board and fixed trips.
#[derive(Default)]
struct MockBackend {
    stations: Vec<(String, StationId)>,
    board: Vec<BoardDeparture>,
    trips: HashMap<String, Vec<StationId>>,
    fail_trips: bool,
    trip_calls: AtomicUsize,
    product_queries: StdMutex<Vec<BTreeSet<Product>>>,
}

impl MockBackend {
    fn new(board: Vec<BoardDeparture>) -> Self {
        Self {
            stations: vec![
                ("S+U Alexanderplatz Bhf (Berlin)".to_string(), station()),
                ("Alexanderplatz".to_string(), StationId::new("other")),
            ],
            board,
            ..Self::default()
        }
    }

    fn with_trip(mut self, trip_id: &str, stops: &[&str]) -> Self {
        self.trips.insert(
            trip_id.to_string(),
            stops.iter().map(|s| StationId::new(*s)).collect(),
        );
        self
    }
}

#[async_trait]
impl LocationSource for MockBackend {
    type Location = StationId;
    type Error = HafasError;

    async fn lookup(&self, _query: &str, _limit: usize) -> Result<Vec<(String, StationId)>, HafasError> {
        Ok(self.stations.clone())
    }
}

#[async_trait]
impl TransitBackend for MockBackend {
    async fn departures(
        &self,
        _station: &StationId,
        _when: chrono::DateTime<Utc>,
        _duration_mins: u32,
        products: &BTreeSet<Product>,
    ) -> Result<Vec<BoardDeparture>, HafasError> {
        self.product_queries.lock().unwrap().push(products.clone());
        Ok(self.board.clone())
    }

    async fn trip_stops(&self, trip_id: &str) -> Result<Vec<StationId>, HafasError> {
        self.trip_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_trips {
            return Err(HafasError::Api {
                status: 400,
                message: "bad trip".to_string(),
            });
        }
        self.trips
            .get(trip_id)
            .cloned()
            .ok_or_else(|| HafasError::NotFound(trip_id.to_string()))
    }
}

async fn provider_with(backend: MockBackend) -> TransitProvider<MockBackend> {
    let provider = TransitProvider::new(backend, LocalZone::default(), &TransitConfig::default());
    provider
        .reconcile(&["S+U Alexanderplatz Bhf (Berlin)".to_string()])
        .await
        .unwrap();
    provider
}

const ALEX: &str = "S+U Alexanderplatz Bhf (Berlin)";

#[tokio::test]
async fn unknown_station_is_an_error() {
    let provider = TransitProvider::new(
        MockBackend::new(Vec::new()),
        LocalZone::default(),
        &TransitConfig::default(),
    );

    let result = provider.departures(&DepartureRequest::new(ALEX, vec![], 5, 0)).await;

    assert!(matches!(result, Err(TransitError::UnknownLocation(name)) if name == ALEX));
}

#[tokio::test]
async fn cancelled_departures_are_dropped() {
    let backend = MockBackend::new(vec![
        board("RE1", "10:00", None, false, Some("3")),
        board("RE2", "10:05", Some(2), true, Some("4")),
    ]);
    let provider = provider_with(backend).await;

    let departures = provider
        .departures(&DepartureRequest::new(ALEX, vec![], 5, 0))
        .await
        .unwrap();

    assert_eq!(departures.len(), 1);
    assert_eq!(departures[0].line, "RE1");
    assert_eq!(departures[0].delay, Duration::zero());
    assert_eq!(departures[0].platform_direction, "3");

    let table = to_table(ALEX, &departures);
    assert_eq!(table.rows[0].departure, "10:00");
}

#[tokio::test]
async fn missing_platform_uses_next_stop_and_memoizes() {
    let backend = MockBackend::new(vec![
        board("S5", "10:00", None, false, None),
        board("S5", "10:10", Some(1), false, None),
        board("S7", "10:03", None, false, None),
    ])
    .with_trip("S5|10:00", &["A", STATION, "B"])
    .with_trip("S7|10:03", &["C", STATION]);
    let provider = provider_with(backend).await;
    let request = DepartureRequest::new(ALEX, vec![], 10, 0);

    let departures = provider.departures(&request).await.unwrap();

    let keys: Vec<(&str, &str)> = departures
        .iter()
        .map(|d| (d.line.as_str(), d.platform_direction.as_str()))
        .collect();
    // S7 terminates here, so its next stop is unknown.
    assert_eq!(keys, vec![("S5", "B"), ("S5", "B"), ("S7", "-1")]);

    // One trip lookup per (station, line direction), none on refresh.
    assert_eq!(provider.backend.trip_calls.load(Ordering::SeqCst), 2);
    provider.departures(&request).await.unwrap();
    assert_eq!(provider.backend.trip_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn platform_departures_skip_trip_lookup() {
    let backend = MockBackend::new(vec![
        board("U2", "10:00", None, false, Some("1")),
        board("U2", "10:04", None, false, Some(" 2 ")),
    ]);
    let provider = provider_with(backend).await;

    let departures = provider
        .departures(&DepartureRequest::new(ALEX, vec![], 10, 0))
        .await
        .unwrap();

    let keys: Vec<&str> = departures.iter().map(|d| d.platform_direction.as_str()).collect();
    assert_eq!(keys, vec!["1", "2"]);
    assert_eq!(provider.backend.trip_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_trip_lookup_propagates_and_is_not_memoized() {
    let mut backend = MockBackend::new(vec![board("S5", "10:00", None, false, None)]);
    backend.fail_trips = true;
    let provider = provider_with(backend).await;
    let request = DepartureRequest::new(ALEX, vec![], 10, 0);

    assert!(matches!(
        provider.departures(&request).await,
        Err(TransitError::DirectionLookup(_))
    ));
    assert!(provider.departures(&request).await.is_err());
    assert_eq!(provider.backend.trip_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rows_are_shared_between_directions() {
    let backend = MockBackend::new(vec![
        board("S1", "10:00", None, false, Some("1")),
        board("S1", "10:10", None, false, Some("1")),
        board("S1", "10:20", None, false, Some("1")),
        board("S1", "10:05", Some(-1), false, Some("2")),
        board("S1", "10:15", None, false, Some("2")),
        board("S1", "10:25", None, false, Some("2")),
    ]);
    let provider = provider_with(backend).await;

    let departures = provider
        .departures(&DepartureRequest::new(ALEX, vec![], 3, 0))
        .await
        .unwrap();

    let summary: Vec<(&str, NaiveDateTime)> = departures
        .iter()
        .map(|d| (d.platform_direction.as_str(), d.actual_departure))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("1", local("10:00")),
            ("1", local("10:10")),
            ("2", local("10:04")),
            ("2", local("10:15")),
        ]
    );
}

#[tokio::test]
async fn categories_select_products() {
    let provider = provider_with(MockBackend::new(Vec::new())).await;

    provider
        .departures(&DepartureRequest::new(ALEX, vec![Category::S, Category::U], 5, 0))
        .await
        .unwrap();
    provider
        .departures(&DepartureRequest::new(ALEX, vec![], 5, 0))
        .await
        .unwrap();

    let queries = provider.backend.product_queries.lock().unwrap().clone();
    assert_eq!(
        queries[0].iter().copied().collect::<Vec<_>>(),
        vec![Product::Suburban, Product::Subway]
    );
    assert_eq!(queries[1].len(), Product::ALL.len());
}

#[tokio::test]
async fn search_prefers_exact_match() {
    let provider = TransitProvider::new(
        MockBackend::new(Vec::new()),
        LocalZone::default(),
        &TransitConfig::default(),
    );

    let names = provider.search("Alexanderplatz", 1).await.unwrap();

    assert_eq!(names, vec!["Alexanderplatz".to_string()]);
    assert_eq!(
        provider.stations().get("Alexanderplatz").await,
        Some(StationId::new("other"))
    );
}

#[test]
fn request_defaults() {
    let request = DepartureRequest::new(ALEX, vec![Category::Bus], 15, 5);
    assert_eq!(request.max_duration_minutes, DEFAULT_MAX_DURATION_MINS);
    assert_eq!(request.with_max_duration(30).max_duration_minutes, 30);
}

#[tokio::test]
async fn boards_with_different_stations_do_not_evict_each_other() {
    let backend = MockBackend::new(vec![board("U2", "10:00", None, false, Some("1"))]);
    let provider = TransitProvider::new(backend, LocalZone::default(), &TransitConfig::default());

    provider.resolve_missing(&[ALEX.to_string()]).await.unwrap();
    provider
        .resolve_missing(&["Alexanderplatz".to_string()])
        .await
        .unwrap();

    let request = DepartureRequest::new(ALEX, vec![], 5, 0);
    assert_eq!(provider.departures(&request).await.unwrap().len(), 1);
    assert!(provider.stations().contains("Alexanderplatz").await);
}

#[tokio::test]
async fn offset_beyond_the_calendar_is_an_error() {
    let backend = MockBackend::new(vec![board("U2", "10:00", None, false, Some("1"))]);
    let provider = provider_with(backend).await;

    for offset in [i64::MAX, i64::MIN] {
        let result = provider
            .departures(&DepartureRequest::new(ALEX, vec![], 5, offset))
            .await;
        assert!(matches!(result, Err(TransitError::InvalidOffset(o)) if o == offset));
    }
    assert!(provider.backend.product_queries.lock().unwrap().is_empty());
}
