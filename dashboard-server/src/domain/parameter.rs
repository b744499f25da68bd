//! MOSMIX forecast parameters and their display units.

use std::fmt;

/// Forecast parameters shown on the weather chart, in MOSMIX naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    /// Air temperature 2 m above ground.
    Temperature,
    WindSpeed,
    /// Sunshine within the last hour.
    SunshineDuration,
    /// Precipitation within the last hour.
    Precipitation,
    /// Relative humidity.
    Humidity,
}

impl Parameter {
    /// Every charted parameter in panel order.
    pub const ALL: [Parameter; 5] = [
        Parameter::Temperature,
        Parameter::WindSpeed,
        Parameter::SunshineDuration,
        Parameter::Precipitation,
        Parameter::Humidity,
    ];

    /// The MOSMIX parameter name.
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature_air_mean_200",
            Parameter::WindSpeed => "wind_speed",
            Parameter::SunshineDuration => "sunshine_duration",
            Parameter::Precipitation => "precipitation_height_significant_weather_last_1h",
            Parameter::Humidity => "humidity",
        }
    }

    /// Panel label: the name up to the first underscore.
    ///
    /// ```
    /// use dashboard_server::domain::Parameter;
    ///
    /// assert_eq!(Parameter::Temperature.label(), "temperature");
    /// assert_eq!(Parameter::Humidity.label(), "humidity");
    /// ```
    pub fn label(&self) -> &'static str {
        let name = self.name();
        name.split('_').next().unwrap_or(name)
    }

    /// Unit after [`normalize`](Self::normalize).
    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Temperature => "°C",
            Parameter::WindSpeed => "km/h",
            Parameter::SunshineDuration => "h",
            Parameter::Precipitation => "mm",
            Parameter::Humidity => "%",
        }
    }

    /// Convert an SI value into the display unit.
    pub fn normalize(&self, value: f64) -> f64 {
        normalize_value(self.name(), value)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit conversion by parameter name prefix.
///
/// `temperature*` K → °C, `wind_speed*` m/s → km/h and
/// `sunshine_duration*` s → h. Everything else passes through.
pub fn normalize_value(parameter: &str, value: f64) -> f64 {
    if parameter.starts_with("temperature") {
        value - 273.15
    } else if parameter.starts_with("wind_speed") {
        value * 3.6
    } else if parameter.starts_with("sunshine_duration") {
        value / 3600.0
    } else {
        value
    }
}
