//! Response models shared by the aggregator and both transports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single measured value with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measurement value; `None` when the provider omitted the field.
    pub value: Option<f64>,
    /// Unit of measurement (e.g. "°C", "%", "mm").
    pub unit: String,
}

impl Measurement {
    pub fn new(value: Option<f64>, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

/// Wind speed and direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Wind speed in `unit`.
    pub speed: Option<f64>,
    /// Bearing in degrees (0–360, meteorological convention).
    pub direction_degrees: Option<f64>,
    /// Cardinal label derived from the bearing (N, NNE, NE, ...).
    pub direction: String,
    /// Speed unit.
    pub unit: String,
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A location as returned by the geocoding provider.
///
/// This is the shape the location cache stores (with a timestamp added)
/// and the `geocode_location` tool returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Display name as the provider ranks it (e.g. "Paris").
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// IANA timezone identifier, or "auto" when the provider omitted it.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "auto".to_string()
}

impl ResolvedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Current weather snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: Measurement,
    pub feels_like: Measurement,
    pub humidity: Measurement,
    pub precipitation: Measurement,
    pub wind: Wind,
    /// Human-readable condition description.
    pub weather: String,
    /// Observation time (ISO 8601, local to the location).
    pub time: String,
}

/// One hourly forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Forecast time (ISO 8601, local to the location).
    pub time: String,
    pub temperature: Measurement,
    pub precipitation_probability: Measurement,
    pub precipitation: Measurement,
    pub weather: String,
    pub wind_speed: Measurement,
}

/// Complete answer to a weather query: resolved location identity,
/// current snapshot, and the truncated hourly forecast.
///
/// Reports are assembled fresh on every call — only the location
/// resolution behind them is cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    #[serde(default)]
    pub country: String,
    pub coordinates: Coordinates,
    pub timezone: String,
    pub current_conditions: CurrentConditions,
    pub hourly_forecast: Vec<HourlyForecast>,
    /// Provenance tag naming the upstream data source.
    pub data_source: String,
}

/// A cache entry: a resolved location plus the moment it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    #[serde(flatten)]
    pub location: ResolvedLocation,
    pub cached_at: DateTime<Utc>,
}

impl CachedLocation {
    pub fn new(location: ResolvedLocation, cached_at: DateTime<Utc>) -> Self {
        Self {
            location,
            cached_at,
        }
    }

    /// Whether this entry is older than `expiry_days`.
    pub fn is_expired(&self, expiry_days: i64, now: DateTime<Utc>) -> bool {
        now - self.cached_at > chrono::Duration::days(expiry_days)
    }
}
