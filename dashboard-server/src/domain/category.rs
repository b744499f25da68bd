//! Transit categories and the product tokens they expand to.

use std::collections::BTreeSet;
use std::fmt;

/// Error returned when parsing an unknown category label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transit category: {0:?}")]
pub struct InvalidCategory(pub String);

/// A HAFAS product token, e.g. `suburban` or `bus`.
///
/// These are the query parameter names the departure endpoint accepts
/// to enable or disable a class of vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Product {
    NationalExpress,
    National,
    RegionalExpress,
    Regional,
    Suburban,
    Subway,
    Bus,
    Tram,
    Ferry,
    Taxi,
}

impl Product {
    /// Every product the backend knows about.
    pub const ALL: [Product; 10] = [
        Product::NationalExpress,
        Product::National,
        Product::RegionalExpress,
        Product::Regional,
        Product::Suburban,
        Product::Subway,
        Product::Bus,
        Product::Tram,
        Product::Ferry,
        Product::Taxi,
    ];

    /// The query parameter name for this product.
    pub fn token(&self) -> &'static str {
        match self {
            Product::NationalExpress => "nationalExpress",
            Product::National => "national",
            Product::RegionalExpress => "regionalExpress",
            Product::Regional => "regional",
            Product::Suburban => "suburban",
            Product::Subway => "subway",
            Product::Bus => "bus",
            Product::Tram => "tram",
            Product::Ferry => "ferry",
            Product::Taxi => "taxi",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// User-facing transit category shown as a checkbox on the dashboard.
///
/// # Examples
///
/// ```
/// use dashboard_server::domain::{Category, Product};
///
/// let s = Category::parse("S").unwrap();
/// assert_eq!(s.products(), &[Product::Suburban]);
/// assert!(Category::parse("Zeppelin").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Long distance and regional trains.
    Bahn,
    /// S-Bahn.
    S,
    /// U-Bahn.
    U,
    Bus,
    Tram,
    /// Ferries and on-demand taxis.
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Bahn,
        Category::S,
        Category::U,
        Category::Bus,
        Category::Tram,
        Category::Other,
    ];

    /// Parse a category from its dashboard label.
    pub fn parse(s: &str) -> Result<Self, InvalidCategory> {
        match s.trim() {
            "Bahn" => Ok(Category::Bahn),
            "S" => Ok(Category::S),
            "U" => Ok(Category::U),
            "Bus" => Ok(Category::Bus),
            "Tram" => Ok(Category::Tram),
            "..." => Ok(Category::Other),
            other => Err(InvalidCategory(other.to_string())),
        }
    }

    /// The dashboard label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Bahn => "Bahn",
            Category::S => "S",
            Category::U => "U",
            Category::Bus => "Bus",
            Category::Tram => "Tram",
            Category::Other => "...",
        }
    }

    /// Backend products covered by this category.
    pub fn products(&self) -> &'static [Product] {
        match self {
            Category::Bahn => &[
                Product::NationalExpress,
                Product::National,
                Product::RegionalExpress,
                Product::Regional,
            ],
            Category::S => &[Product::Suburban],
            Category::U => &[Product::Subway],
            Category::Bus => &[Product::Bus],
            Category::Tram => &[Product::Tram],
            Category::Other => &[Product::Ferry, Product::Taxi],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Union the products of every requested category.
///
/// An empty selection means "everything".
pub fn product_filter(categories: &[Category]) -> BTreeSet<Product> {
    if categories.is_empty() {
        return Product::ALL.into_iter().collect();
    }
    categories
        .iter()
        .flat_map(|c| c.products().iter().copied())
        .collect()
}

/// Parse a comma separated category list such as `"S,U"`.
///
/// Blank input yields an empty list (all categories).
pub fn parse_category_list(s: &str) -> Result<Vec<Category>, InvalidCategory> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Category::parse)
        .collect()
}
