//! Application state for the web layer.

use std::sync::Arc;

use crate::config::DashboardSettings;
use crate::domain::LocalZone;
use crate::geocode::Geocoder;
use crate::hafas::HafasClient;
use crate::mosmix::MosmixClient;
use crate::transit::TransitProvider;
use crate::weather::WeatherProvider;

pub type Transit = TransitProvider<HafasClient>;
pub type Weather = WeatherProvider<Geocoder, MosmixClient>;

/// Shared application state.
///
/// The providers own the location caches and the direction memo, so
/// every request sees the same selection state.
#[derive(Clone)]
pub struct AppState {
    pub transit: Arc<Transit>,
    pub weather: Arc<Weather>,
    /// Refresh intervals and form defaults
    pub settings: Arc<DashboardSettings>,
    pub zone: LocalZone,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        transit: Transit,
        weather: Weather,
        settings: DashboardSettings,
        zone: LocalZone,
    ) -> Self {
        Self {
            transit: Arc::new(transit),
            weather: Arc::new(weather),
            settings: Arc::new(settings),
            zone,
        }
    }
}
