//! HTTP route handlers.

use std::path::Path;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use futures::stream::{self, StreamExt};
use tower_http::services::ServeDir;
use tracing::{error, warn};

use crate::locations::LocationProvider;
use crate::transit::{DepartureRequest, TransitError, to_table};
use crate::weather::{WeatherError, to_chart};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Stations fetched concurrently for one board.
const BOARD_CONCURRENCY: usize = 4;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/health", get(health))
        .route("/clock", get(clock))
        .route("/api/transit/locations", get(transit_locations))
        .route("/api/weather/locations", get(weather_locations))
        .route("/transit/board", get(transit_board))
        .route("/weather/chart", get(weather_chart))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The dashboard page.
async fn dashboard_page(State(state): State<AppState>) -> DashboardTemplate {
    DashboardTemplate::new(&state.settings, state.zone.name(), clock_text(&state))
}

/// Current local time, e.g. `"14:05 Uhr"`.
async fn clock(State(state): State<AppState>) -> String {
    clock_text(&state)
}

fn clock_text(state: &AppState) -> String {
    format!("{} Uhr", state.zone.now().format("%H:%M"))
}

/// Station suggestions: the current selection followed by new matches.
async fn transit_locations(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<LocationsResponse>, AppError> {
    let query = LocationQuery::from_pairs(pairs);
    let found = state
        .transit
        .search(&query.q, state.settings.suggestion_limit)
        .await?;

    Ok(Json(LocationsResponse {
        options: merge_options(query.selected, found),
    }))
}

/// Place suggestions: the current selection followed by new matches.
async fn weather_locations(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<LocationsResponse>, AppError> {
    let query = LocationQuery::from_pairs(pairs);
    let found = state
        .weather
        .search(&query.q, state.settings.suggestion_limit)
        .await?;

    Ok(Json(LocationsResponse {
        options: merge_options(query.selected, found),
    }))
}

/// Departure tables for the selected stations.
///
/// A station that fails gets an error card in its slot; the rest of the
/// board still renders.
async fn transit_board(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Html<String>, AppError> {
    let query = BoardQuery::from_pairs(pairs)?;

    let stations = state.transit.stations();
    stations.evict_idle(state.settings.transit_idle()).await;
    if let Err(e) = state.transit.resolve_missing(&query.names()).await {
        warn!(error = %e, "station selection only partly resolved");
    }

    let rows = query.rows.unwrap_or(state.settings.default_rows);
    let offset = query
        .offset
        .unwrap_or(state.settings.default_offset_minutes);
    let transit = &state.transit;

    let cards: Vec<BoardCard> = stream::iter(query.stations)
        .map(|selection| async move {
            let request = DepartureRequest::new(
                selection.name.clone(),
                selection.categories,
                rows,
                offset,
            );
            match transit.departures(&request).await {
                Ok(departures) => BoardCard::table(to_table(&selection.name, &departures)),
                Err(e) => {
                    warn!(station = %selection.name, error = %e, "departures unavailable");
                    BoardCard::error(&selection.name, e.to_string())
                }
            }
        })
        .buffered(BOARD_CONCURRENCY)
        .collect()
        .await;

    render(&DeparturesTemplate {
        cards,
        theme: query.theme,
    })
}

/// Forecast chart for the selected places.
async fn weather_chart(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Html<String>, AppError> {
    let query = ChartQuery::from_pairs(pairs);

    let places = state.weather.places();
    places.evict_idle(state.settings.weather_idle()).await;
    if let Err(e) = state.weather.resolve_missing(&query.locations).await {
        warn!(error = %e, "place selection only partly resolved");
    }

    let mut known = Vec::with_capacity(query.locations.len());
    let mut skipped = Vec::new();
    for name in query.locations {
        if places.contains(&name).await {
            known.push(name);
        } else {
            skipped.push(name);
        }
    }

    let forecast = state.weather.fetch(known).await?;
    skipped.extend(forecast.skipped);

    render(&WeatherChartTemplate {
        chart: to_chart(&forecast.records, state.zone.today(), query.theme),
        skipped,
    })
}

fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| AppError::Internal {
        message: format!("Template error: {e}"),
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// A backend failed or answered nonsense.
    BadGateway { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::BadGateway { message }
            | AppError::Internal { message } => message,
        }
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<TransitError> for AppError {
    fn from(e: TransitError) -> Self {
        match e {
            TransitError::UnknownLocation(_) => AppError::NotFound {
                message: e.to_string(),
            },
            TransitError::InvalidOffset(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::UnknownLocation(_) => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, reason = self.message(), "request failed");
        } else {
            warn!(%status, reason = self.message(), "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}
