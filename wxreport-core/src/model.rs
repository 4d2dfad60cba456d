use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::moon::MoonPhase;

/// Latest observation from a station. Any measurement may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub description: String,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_mph: Option<f64>,
}

impl Observation {
    pub fn temperature_f(&self) -> Option<f64> {
        self.temperature_c.map(celsius_to_fahrenheit)
    }
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub station_id: String,
    pub observation: Observation,
    /// `None` when the sunrise/sunset lookup failed.
    pub sun: Option<SunTimes>,
    pub moon_phase: MoonPhase,
}

/// One period of an hourly or daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
    pub temperature: i32,
    pub temperature_unit: String,
    pub short_forecast: String,
}

impl ForecastPeriod {
    /// e.g. "72°F"
    pub fn temperature_label(&self) -> String {
        format!("{}°{}", self.temperature, self.temperature_unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecasts {
    pub hourly: Vec<ForecastPeriod>,
    pub daily: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub event: String,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
}

/// Radar loop saved to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarImage {
    pub station_id: String,
    pub distance_km: f64,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Coarse sky category derived from a free-text forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sky {
    Rain,
    Snow,
    Sunny,
    Cloudy,
    Other,
}

impl Sky {
    /// First matching keyword wins, so "Rain And Snow" is `Rain`.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();

        if lower.contains("rain") {
            Sky::Rain
        } else if lower.contains("snow") {
            Sky::Snow
        } else if lower.contains("sun") || lower.contains("clear") {
            Sky::Sunny
        } else if lower.contains("cloud") {
            Sky::Cloudy
        } else {
            Sky::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemperatureBand {
    Cold,
    Mild,
    Hot,
}

impl TemperatureBand {
    pub fn from_fahrenheit(f: f64) -> Self {
        if f > 85.0 {
            TemperatureBand::Hot
        } else if f < 50.0 {
            TemperatureBand::Cold
        } else {
            TemperatureBand::Mild
        }
    }
}
