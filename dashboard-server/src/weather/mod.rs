//! Weather forecasts for user-selected places.
//!
//! Places are geocoded into coordinates, each coordinate is matched to the
//! nearest MOSMIX station and the station series are charted.

mod backend;
mod chart;
mod provider;

pub use backend::ForecastBackend;
pub use chart::{CHART_DAYS, Chart, LegendEntry, Panel, Series, Theme, Tick, to_chart};
pub use provider::{Forecast, ForecastRecord, STATION_RADIUS_KM, WeatherError, WeatherProvider};
