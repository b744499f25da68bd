//! The forecast backend seam.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;

use crate::domain::{Coordinates, Parameter};
use crate::mosmix::{ForecastError, ForecastStation, MosmixClient, RawForecast};

/// Station lookup and forecast series.
#[async_trait]
pub trait ForecastBackend: Send + Sync {
    /// Closest forecast station within `radius_km` of `at`.
    async fn nearest_station(
        &self,
        at: Coordinates,
        radius_km: f64,
    ) -> Result<Option<ForecastStation>, ForecastError>;

    /// Full forecast series of every station in `station_ids`.
    async fn forecast(
        &self,
        station_ids: &[String],
        parameters: &[Parameter],
    ) -> Result<Vec<RawForecast>, ForecastError>;
}

#[async_trait]
impl ForecastBackend for MosmixClient {
    async fn nearest_station(
        &self,
        at: Coordinates,
        radius_km: f64,
    ) -> Result<Option<ForecastStation>, ForecastError> {
        MosmixClient::nearest_station(self, at, radius_km).await
    }

    async fn forecast(
        &self,
        station_ids: &[String],
        parameters: &[Parameter],
    ) -> Result<Vec<RawForecast>, ForecastError> {
        let from = Utc::now().date_naive();
        let series = try_join_all(
            station_ids
                .iter()
                .map(|id| self.station_forecast(id, from, parameters)),
        )
        .await?;
        Ok(series.into_iter().flatten().collect())
    }
}
