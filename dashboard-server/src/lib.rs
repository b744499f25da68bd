//! Transit departures and weather forecast dashboard server.
//!
//! A web application that shows live departure boards for selected
//! stations next to a multi-day forecast for selected places.

pub mod config;
pub mod domain;
pub mod geocode;
pub mod hafas;
pub mod locations;
pub mod mosmix;
pub mod retry;
pub mod transit;
pub mod weather;
pub mod web;
