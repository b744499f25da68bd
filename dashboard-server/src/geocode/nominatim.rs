//! OpenStreetMap Nominatim search.
//!
//! Needs no key but requires an identifying user agent and allows about
//! one request per second, so the client never runs requests in parallel.

use serde::Deserialize;
use tracing::warn;

use crate::domain::Coordinates;

use super::error::GeocodeError;
use super::transport::{JsonClient, parse_base_url};

/// One `format=jsonv2` search hit. Coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

pub fn nominatim_matches(places: &[NominatimPlace]) -> Vec<(String, Coordinates)> {
    places
        .iter()
        .filter_map(|place| match (place.lat.parse(), place.lon.parse()) {
            (Ok(lat), Ok(lon)) => Some((place.display_name.clone(), Coordinates::new(lat, lon))),
            _ => {
                warn!(name = %place.display_name, "skipping place with invalid coordinates");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: JsonClient,
    url: reqwest::Url,
}

impl NominatimClient {
    pub(super) fn new(http: JsonClient, url: &str) -> Result<Self, GeocodeError> {
        Ok(Self {
            http,
            url: parse_base_url(url)?,
        })
    }

    pub async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, Coordinates)>, GeocodeError> {
        let places: Vec<NominatimPlace> = self
            .http
            .get_json(
                self.url.clone(),
                vec![
                    ("q", query.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("limit", limit.max(1).to_string()),
                ],
            )
            .await?;
        Ok(nominatim_matches(&places))
    }
}
