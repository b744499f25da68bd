//! Public transit departures.
//!
//! The provider resolves station names, fetches departure boards,
//! disambiguates directions and trims the board to the requested size.
//! Rendering helpers turn the result into table rows.

mod backend;
mod board;
mod provider;
mod table;

pub use backend::TransitBackend;
pub use board::{
    Departure, UNKNOWN_NEXT_STOP, explicit_platform, group_and_truncate, line_direction,
    next_stop_after, rows_per_group,
};
pub use provider::{
    DEFAULT_MAX_DURATION_MINS, DepartureRequest, TransitConfig, TransitError, TransitProvider,
};
pub use table::{DelayClass, DepartureRow, DepartureTable, delay_minutes, format_departure, to_table};
