//! HERE geocoding v7.

use serde::Deserialize;

use crate::domain::Coordinates;

use super::error::GeocodeError;
use super::transport::{JsonClient, parse_base_url};

#[derive(Debug, Clone, Deserialize)]
pub struct HereResponse {
    #[serde(default)]
    pub items: Vec<HereItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HereItem {
    pub title: String,
    pub position: Option<HerePosition>,
    pub address: Option<HereAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HerePosition {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HereAddress {
    pub label: Option<String>,
}

impl HereItem {
    /// Address label if present, else the title.
    pub fn display_name(&self) -> &str {
        self.address
            .as_ref()
            .and_then(|a| a.label.as_deref())
            .unwrap_or(&self.title)
    }
}

/// Named coordinates from a HERE response; items without a position are
/// dropped.
pub fn here_matches(response: &HereResponse) -> Vec<(String, Coordinates)> {
    response
        .items
        .iter()
        .filter_map(|item| {
            let pos = item.position.as_ref()?;
            Some((item.display_name().to_string(), Coordinates::new(pos.lat, pos.lng)))
        })
        .collect()
}

/// HERE geocoding client; requires an API key.
#[derive(Debug, Clone)]
pub struct HereClient {
    http: JsonClient,
    url: reqwest::Url,
    api_key: String,
}

impl HereClient {
    pub(super) fn new(http: JsonClient, url: &str, api_key: String) -> Result<Self, GeocodeError> {
        Ok(Self {
            http,
            url: parse_base_url(url)?,
            api_key,
        })
    }

    pub async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, Coordinates)>, GeocodeError> {
        let response: HereResponse = self
            .http
            .get_json(
                self.url.clone(),
                vec![
                    ("q", query.to_string()),
                    ("limit", limit.max(1).to_string()),
                    ("apiKey", self.api_key.clone()),
                ],
            )
            .await?;
        Ok(here_matches(&response))
    }
}
