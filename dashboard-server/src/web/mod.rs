//! Web layer for the dashboard.
//!
//! Serves the dashboard page, JSON location suggestions and the HTML
//! fragments the page polls.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Transit, Weather};
pub use templates::*;
