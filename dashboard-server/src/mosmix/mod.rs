//! DWD MOSMIX forecasts via the Bright Sky JSON API.
//!
//! MOSMIX is the statistical point forecast of the German weather
//! service, published for a few thousand stations. The client finds the
//! station nearest to a coordinate and fetches its hourly series.

mod client;
mod convert;
mod error;
mod types;

pub use client::{MosmixClient, MosmixConfig};
pub use convert::{ForecastStation, RawForecast};
pub use error::ForecastError;
pub use types::{SourceItem, SourcesResponse, WeatherItem, WeatherResponse};
