//! Data transfer objects for web requests and responses.
//!
//! Selections arrive as repeated query keys (`station=A&station=B`), so
//! requests are read as raw key/value pairs and assembled here.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::domain::{Category, InvalidCategory, parse_category_list};
use crate::weather::Theme;

/// Accepted `rows` values.
pub const ROWS_RANGE: RangeInclusive<usize> = 1..=100;

/// Accepted `offset` values in minutes: one day back to one week ahead.
pub const OFFSET_RANGE: RangeInclusive<i64> = -1440..=10_080;

/// Query string as ordered key/value pairs.
pub type QueryPairs = Vec<(String, String)>;

/// Errors in request parameters.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error(transparent)]
    Category(#[from] InvalidCategory),
}

/// Location search: `q` plus the currently selected names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationQuery {
    pub q: String,
    pub selected: Vec<String>,
}

impl LocationQuery {
    pub fn from_pairs(pairs: QueryPairs) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => query.q = value,
                "selected" => push_name(&mut query.selected, value),
                _ => {}
            }
        }
        query
    }
}

/// A station on the board with its enabled categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSelection {
    pub name: String,
    /// Empty means all categories.
    pub categories: Vec<Category>,
}

/// Departure board request.
///
/// The n-th `categories` value belongs to the n-th `station`; missing
/// entries select all categories.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardQuery {
    pub stations: Vec<StationSelection>,
    pub rows: Option<usize>,
    pub offset: Option<i64>,
    pub theme: Theme,
}

impl BoardQuery {
    pub fn from_pairs(pairs: QueryPairs) -> Result<Self, QueryError> {
        let mut names = Vec::new();
        let mut categories = Vec::new();
        let mut rows = None;
        let mut offset = None;
        let mut theme = Theme::default();

        for (key, value) in pairs {
            match key.as_str() {
                "station" => names.push(value),
                "categories" => categories.push(parse_category_list(&value)?),
                "rows" => rows = Some(parse_bounded("rows", &value, &ROWS_RANGE)?),
                "offset" => offset = Some(parse_bounded("offset", &value, &OFFSET_RANGE)?),
                "theme" => theme = Theme::parse(&value),
                _ => {}
            }
        }

        let mut categories = categories.into_iter();
        let mut stations: Vec<StationSelection> = Vec::with_capacity(names.len());
        for name in names {
            let selected = categories.next().unwrap_or_default();
            let name = name.trim().to_string();
            if name.is_empty() || stations.iter().any(|s| s.name == name) {
                continue;
            }
            stations.push(StationSelection {
                name,
                categories: selected,
            });
        }

        Ok(Self {
            stations,
            rows,
            offset,
            theme,
        })
    }

    /// Names of the selected stations in board order.
    pub fn names(&self) -> Vec<String> {
        self.stations.iter().map(|s| s.name.clone()).collect()
    }
}

/// Weather chart request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartQuery {
    pub locations: Vec<String>,
    pub theme: Theme,
}

impl ChartQuery {
    pub fn from_pairs(pairs: QueryPairs) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "location" => push_name(&mut query.locations, value),
                "theme" => query.theme = Theme::parse(&value),
                _ => {}
            }
        }
        query
    }
}

fn push_name(names: &mut Vec<String>, value: String) {
    let name = value.trim();
    if !name.is_empty() && !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

fn parse_bounded<T>(field: &'static str, value: &str, range: &RangeInclusive<T>) -> Result<T, QueryError>
where
    T: std::str::FromStr + PartialOrd,
{
    value
        .trim()
        .parse()
        .ok()
        .filter(|n| range.contains(n))
        .ok_or_else(|| QueryError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Dropdown options for a location search.
#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub options: Vec<String>,
}

/// Selected names first, then new matches.
pub fn merge_options(selected: Vec<String>, found: Vec<String>) -> Vec<String> {
    let mut options = selected;
    for name in found {
        if !options.contains(&name) {
            options.push(name);
        }
    }
    options
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
