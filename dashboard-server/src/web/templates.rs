//! Askama templates for the dashboard.

use askama::Template;

use crate::config::DashboardSettings;
use crate::domain::Category;
use crate::transit::DepartureTable;
use crate::weather::{Chart, Theme};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// The dashboard page.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub settings: DashboardSettings,
    pub categories: Vec<&'static str>,
    pub zone: &'static str,
    /// Initial clock text.
    pub clock: String,
}

impl DashboardTemplate {
    pub fn new(settings: &DashboardSettings, zone: &'static str, clock: String) -> Self {
        Self {
            settings: settings.clone(),
            categories: Category::ALL.iter().map(|c| c.label()).collect(),
            zone,
            clock,
        }
    }
}

// ============================================================================
// Fragment Templates (polled by dashboard.js, no base.html)
// ============================================================================

/// Departure tables, one card per selected station.
#[derive(Template)]
#[template(path = "departures.html")]
pub struct DeparturesTemplate {
    pub cards: Vec<BoardCard>,
    pub theme: Theme,
}

/// Forecast chart with the places that could not be charted.
#[derive(Template)]
#[template(path = "weather_chart.html")]
pub struct WeatherChartTemplate {
    pub chart: Chart,
    pub skipped: Vec<String>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// One station slot on the departure board.
#[derive(Debug, Clone)]
pub struct BoardCard {
    pub title: String,
    pub table: Option<DepartureTable>,
    /// Shown instead of the table when the fetch failed.
    pub error: Option<String>,
}

impl BoardCard {
    pub fn table(table: DepartureTable) -> Self {
        Self {
            title: table.title.clone(),
            table: Some(table),
            error: None,
        }
    }

    pub fn error(name: &str, message: impl Into<String>) -> Self {
        Self {
            title: crate::domain::short_name(name).to_string(),
            table: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit::{DelayClass, DepartureRow};
    use crate::weather::to_chart;
    use chrono::NaiveDate;

    fn table() -> DepartureTable {
        DepartureTable {
            name: "S Ostkreuz Bhf (Berlin), Berlin".to_string(),
            title: "S Ostkreuz Bhf (Berlin)".to_string(),
            rows: vec![DepartureRow {
                departure: "10:00 (+2)".to_string(),
                line: "S3".to_string(),
                direction: "Erkner <Bhf>".to_string(),
                platform: "4".to_string(),
                delay_class: DelayClass::Late,
                shaded: true,
            }],
        }
    }

    #[test]
    fn departures_render_rows_and_errors() {
        let template = DeparturesTemplate {
            cards: vec![
                BoardCard::table(table()),
                BoardCard::error("Nowhere, Land", "unknown station: Nowhere, Land"),
            ],
            theme: Theme::Dark,
        };

        let html = template.render().unwrap();

        assert!(html.contains("S Ostkreuz Bhf (Berlin)"));
        assert!(html.contains("10:00 (+2)"));
        assert!(html.contains("late"));
        assert!(html.contains("shaded"));
        assert!(html.contains("Erkner &lt;Bhf&gt;"));
        assert!(html.contains("unknown station: Nowhere, Land"));
        assert!(html.contains(">Nowhere<"));
    }

    #[test]
    fn chart_renders_svg() {
        let template = WeatherChartTemplate {
            chart: to_chart(&[], NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), Theme::Light),
            skipped: vec!["Nordsee".to_string()],
        };

        let html = template.render().unwrap();

        assert!(html.contains("Nordsee"));
        assert!(!html.contains("<polyline"));
    }

    #[test]
    fn dashboard_lists_categories() {
        let template = DashboardTemplate::new(&DashboardSettings::default(), "Europe/Berlin", "10:00 Uhr".into());

        let html = template.render().unwrap();

        assert!(html.contains("data-transit-refresh=\"60\""));
        assert!(html.contains("10:00 Uhr"));
        for label in ["Bahn", "S", "U", "Bus", "Tram", "..."] {
            assert!(html.contains(&format!("value=\"{label}\"")));
        }
    }
}
