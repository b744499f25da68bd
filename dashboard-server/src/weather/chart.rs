//! Forecast chart geometry.
//!
//! One panel per parameter stacked vertically, one polyline per station,
//! sharing an x axis from today 00:00 to four days later. The template
//! only places the precomputed coordinates into an SVG.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::Parameter;

use super::provider::ForecastRecord;

/// Days shown on the x axis.
pub const CHART_DAYS: u64 = 4;

pub const WIDTH: f64 = 960.0;
const MARGIN_LEFT: f64 = 110.0;
const MARGIN_RIGHT: f64 = 10.0;
const LEGEND_HEIGHT: f64 = 30.0;
const PANEL_HEIGHT: f64 = 130.0;
const PANEL_GAP: f64 = 24.0;
const AXIS_HEIGHT: f64 = 24.0;
const LEGEND_SPACING: f64 = 180.0;

/// Line colours, assigned to stations in name order.
const PALETTE: [&str; 6] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3",
];

/// Colour scheme of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// `"dark"` selects the dark theme; anything else is light.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Axis label at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub pos: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub station_name: String,
    pub color: &'static str,
    /// SVG polyline `points` attribute.
    pub points: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub label: &'static str,
    pub unit: &'static str,
    pub top: f64,
    pub bottom: f64,
    /// y of the value zero.
    pub zero_y: f64,
    pub y_ticks: Vec<Tick>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub station_name: String,
    pub color: &'static str,
    /// Left edge of the entry.
    pub x: f64,
}

/// A renderable forecast chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub width: f64,
    pub height: f64,
    pub plot_left: f64,
    pub plot_right: f64,
    pub theme: Theme,
    pub legend: Vec<LegendEntry>,
    pub x_ticks: Vec<Tick>,
    pub panels: Vec<Panel>,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

/// Linear map of `[lo, hi]` onto `[out_lo, out_hi]`.
fn scale(value: f64, lo: f64, hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    out_lo + (value - lo) / (hi - lo) * (out_hi - out_lo)
}

/// Value range of a panel: data plus zero, padded by 5 %.
fn y_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi - lo < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn format_value(value: f64) -> String {
    if value.abs() >= 10.0 || value == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Build the chart from forecast records.
///
/// Values are normalized to display units and clipped to the window
/// `[today 00:00, today + 4 days 00:00]`. Parameters without values in
/// the window get no panel.
pub fn to_chart(records: &[ForecastRecord], today: NaiveDate, theme: Theme) -> Chart {
    let start = today.and_time(NaiveTime::MIN);
    let end = today
        .checked_add_days(Days::new(CHART_DAYS))
        .unwrap_or(today)
        .and_time(NaiveTime::MIN);
    let span = (end - start).num_seconds().max(1) as f64;

    let plot_left = MARGIN_LEFT;
    let plot_right = WIDTH - MARGIN_RIGHT;
    let x_of = |t: NaiveDateTime| {
        scale(
            (t - start).num_seconds() as f64,
            0.0,
            span,
            plot_left,
            plot_right,
        )
    };

    let visible: Vec<&ForecastRecord> = records
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp <= end)
        .collect();

    // (id, name) per station, ordered by name; stations sharing a name stay apart.
    let mut stations: Vec<(&str, &str)> = visible
        .iter()
        .map(|r| (r.station_id.as_str(), r.station_name.as_str()))
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .collect();
    stations.sort_by_key(|&(id, name)| (name, id));
    let color_of = |id: &str| {
        let idx = stations.iter().position(|(s, _)| *s == id).unwrap_or(0);
        PALETTE[idx % PALETTE.len()]
    };

    let mut panels = Vec::new();
    for parameter in Parameter::ALL {
        let values: Vec<(&ForecastRecord, f64)> = visible
            .iter()
            .filter(|r| r.parameter == parameter)
            .map(|r| (*r, parameter.normalize(r.value)))
            .collect();
        if values.is_empty() {
            continue;
        }

        let top = LEGEND_HEIGHT + panels.len() as f64 * (PANEL_HEIGHT + PANEL_GAP);
        let bottom = top + PANEL_HEIGHT;
        let (lo, hi) = y_range(values.iter().map(|(_, v)| *v));
        let y_of = |v: f64| scale(v, lo, hi, bottom, top);

        let mut series = Vec::new();
        for &(id, name) in &stations {
            let mut points: Vec<(NaiveDateTime, f64)> = values
                .iter()
                .filter(|(r, _)| r.station_id == id)
                .map(|(r, v)| (r.timestamp, *v))
                .collect();
            if points.is_empty() {
                continue;
            }
            points.sort_by_key(|(t, _)| *t);

            let points = points
                .iter()
                .map(|(t, v)| format!("{:.1},{:.1}", x_of(*t), y_of(*v)))
                .collect::<Vec<_>>()
                .join(" ");
            series.push(Series {
                station_name: name.to_string(),
                color: color_of(id),
                points,
            });
        }

        let y_ticks = [lo, 0.0, hi]
            .into_iter()
            .map(|v| Tick {
                pos: y_of(v),
                label: format_value(v),
            })
            .collect();

        panels.push(Panel {
            label: parameter.label(),
            unit: parameter.unit(),
            top,
            bottom,
            zero_y: y_of(0.0),
            y_ticks,
            series,
        });
    }

    let x_ticks = (0..=CHART_DAYS)
        .filter_map(|d| today.checked_add_days(Days::new(d)))
        .map(|day| Tick {
            pos: x_of(day.and_time(NaiveTime::MIN)),
            label: day.format("%d.%m.").to_string(),
        })
        .collect();

    let legend = stations
        .iter()
        .enumerate()
        .map(|(idx, &(id, name))| LegendEntry {
            station_name: name.to_string(),
            color: color_of(id),
            x: plot_left + idx as f64 * LEGEND_SPACING,
        })
        .collect();

    let height = LEGEND_HEIGHT
        + panels.len() as f64 * (PANEL_HEIGHT + PANEL_GAP)
        + AXIS_HEIGHT;

    Chart {
        width: WIDTH,
        height,
        plot_left,
        plot_right,
        theme,
        legend,
        x_ticks,
        panels,
    }
}
