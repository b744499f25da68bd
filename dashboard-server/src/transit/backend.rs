//! The transit backend seam.
//!
//! The provider only needs three queries from a routing backend. Keeping
//! them behind a trait lets the provider logic run against in-memory
//! boards in tests.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Product, StationId};
use crate::hafas::{BoardDeparture, HafasClient, HafasError};
use crate::locations::LocationSource;

/// Station search, departure boards and trip stop sequences.
#[async_trait]
pub trait TransitBackend: LocationSource<Location = StationId, Error = HafasError> {
    /// Departures from `station` starting at `when` within `duration_mins`.
    async fn departures(
        &self,
        station: &StationId,
        when: DateTime<Utc>,
        duration_mins: u32,
        products: &BTreeSet<Product>,
    ) -> Result<Vec<BoardDeparture>, HafasError>;

    /// Stop ids of a trip in travel order.
    async fn trip_stops(&self, trip_id: &str) -> Result<Vec<StationId>, HafasError>;
}

#[async_trait]
impl LocationSource for HafasClient {
    type Location = StationId;
    type Error = HafasError;

    async fn lookup(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, StationId)>, HafasError> {
        self.locations(query, limit).await
    }
}

#[async_trait]
impl TransitBackend for HafasClient {
    async fn departures(
        &self,
        station: &StationId,
        when: DateTime<Utc>,
        duration_mins: u32,
        products: &BTreeSet<Product>,
    ) -> Result<Vec<BoardDeparture>, HafasError> {
        HafasClient::departures(self, station, when, duration_mins, products).await
    }

    async fn trip_stops(&self, trip_id: &str) -> Result<Vec<StationId>, HafasError> {
        HafasClient::trip_stops(self, trip_id).await
    }
}
