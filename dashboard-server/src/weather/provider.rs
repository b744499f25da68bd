//! Weather provider: places, nearest stations and forecast records.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::domain::{Coordinates, LocalZone, Parameter};
use crate::geocode::GeocodeError;
use crate::locations::{LocationCache, LocationProvider, LocationSource};
use crate::mosmix::ForecastError;

use super::backend::ForecastBackend;

/// Search radius around a place for its forecast station.
pub const STATION_RADIUS_KM: f64 = 50.0;

/// Errors from the weather provider.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The place was never resolved through search or reconcile
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// Geocoding failed
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// Station lookup or forecast request failed
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// A forecast value in local time, SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub station_id: String,
    pub station_name: String,
    pub timestamp: NaiveDateTime,
    pub parameter: Parameter,
    pub value: f64,
}

/// Result of a weather fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub records: Vec<ForecastRecord>,
    /// Places without a forecast station in range.
    pub skipped: Vec<String>,
}

/// Forecasts for user-selected places.
pub struct WeatherProvider<G, B>
where
    G: LocationSource<Location = Coordinates, Error = GeocodeError>,
    B: ForecastBackend,
{
    places: LocationCache<G>,
    backend: B,
    parameters: Vec<Parameter>,
    radius_km: f64,
    zone: LocalZone,
}

impl<G, B> WeatherProvider<G, B>
where
    G: LocationSource<Location = Coordinates, Error = GeocodeError>,
    B: ForecastBackend,
{
    pub fn new(geocoder: G, backend: B, zone: LocalZone) -> Self {
        Self {
            places: LocationCache::new(geocoder),
            backend,
            parameters: Parameter::ALL.to_vec(),
            radius_km: STATION_RADIUS_KM,
            zone,
        }
    }

    /// The place cache.
    pub fn places(&self) -> &LocationCache<G> {
        &self.places
    }

    /// Forecast records for cached places.
    ///
    /// Each place maps to its nearest station; places sharing a station
    /// share its series. When several places resolve to the same station
    /// id the last one's station name is kept.
    pub async fn forecast(&self, names: &[String]) -> Result<Forecast, WeatherError> {
        let mut stations: BTreeMap<String, String> = BTreeMap::new();
        let mut skipped = Vec::new();

        for name in names {
            let at = self
                .places
                .get(name)
                .await
                .ok_or_else(|| WeatherError::UnknownLocation(name.clone()))?;

            match self.backend.nearest_station(at, self.radius_km).await? {
                Some(station) => {
                    debug!(place = %name, station = %station.id, km = station.distance_km, "nearest station");
                    stations.insert(station.id, station.name);
                }
                None => {
                    warn!(place = %name, radius_km = self.radius_km, "no forecast station in range");
                    skipped.push(name.clone());
                }
            }
        }

        if stations.is_empty() {
            return Ok(Forecast {
                records: Vec::new(),
                skipped,
            });
        }

        let ids: Vec<String> = stations.keys().cloned().collect();
        let raw = self.backend.forecast(&ids, &self.parameters).await?;

        let records: Vec<ForecastRecord> = raw
            .into_iter()
            .map(|r| ForecastRecord {
                station_name: stations
                    .get(&r.station_id)
                    .cloned()
                    .unwrap_or_else(|| r.station_id.clone()),
                timestamp: self.zone.to_local(&r.timestamp),
                station_id: r.station_id,
                parameter: r.parameter,
                value: r.value,
            })
            .collect();

        info!(stations = ids.len(), records = records.len(), "forecast updated");
        Ok(Forecast { records, skipped })
    }
}

#[async_trait]
impl<G, B> LocationProvider for WeatherProvider<G, B>
where
    G: LocationSource<Location = Coordinates, Error = GeocodeError>,
    B: ForecastBackend,
{
    type Request = Vec<String>;
    type Output = Forecast;
    type Error = WeatherError;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, WeatherError> {
        Ok(self.places.search(query, limit).await?)
    }

    async fn reconcile(&self, names: &[String]) -> Result<(), WeatherError> {
        Ok(self.places.reconcile(names).await?)
    }

    async fn resolve_missing(&self, names: &[String]) -> Result<(), WeatherError> {
        Ok(self.places.resolve_missing(names).await?)
    }

    async fn fetch(&self, request: Vec<String>) -> Result<Forecast, WeatherError> {
        self.forecast(&request).await
    }
}
