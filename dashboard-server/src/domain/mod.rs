//! Domain types shared by the transit and weather providers.
//!
//! Identifiers, transit categories, forecast parameters and local time
//! conversion. Provider specific records live with their providers.

mod category;
mod location;
mod parameter;
mod time;

pub use category::{Category, InvalidCategory, Product, parse_category_list, product_filter};
pub use location::{Coordinates, StationId, short_name};
pub use parameter::{Parameter, normalize_value};
pub use time::{DEFAULT_ZONE, LocalZone};
