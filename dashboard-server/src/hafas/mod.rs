//! HAFAS (public transit routing) client.
//!
//! This module provides an HTTP client for db-rest style HAFAS
//! endpoints, which expose station search, live departure boards and
//! trip details for German public transport.
//!
//! Key characteristics of HAFAS:
//! - Timestamps carry an explicit UTC offset
//! - Delays are reported in seconds and are `null` without realtime data
//! - Cancelled departures stay on the board with `cancelled: true`

mod client;
mod convert;
mod error;
mod types;

pub use client::{HafasClient, HafasConfig};
pub use convert::{BoardDeparture, ConversionError};
pub use error::HafasError;
pub use types::{DepartureItem, DeparturesResponse, LineRef, LocationItem, StopRef, TripResponse};
