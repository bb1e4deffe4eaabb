//! Domain models and vocabulary for the weather tool service.
//!
//! This crate holds everything that is pure data or pure computation:
//! the report shapes returned to callers, the WMO condition-code
//! vocabulary, the 16-sector wind compass, and location parsing with
//! cache-key normalization. It performs no I/O and has no async code,
//! so every other crate in the workspace can depend on it freely.

pub mod conditions;
pub mod location;
pub mod models;

pub use conditions::{describe_weather_code, wind_direction};
pub use location::{cache_key, LocationQuery};
pub use models::{
    CachedLocation, Coordinates, CurrentConditions, HourlyForecast, Measurement, ResolvedLocation,
    WeatherReport, Wind,
};

/// Attribution string carried in every report's `data_source` field.
pub const DATA_SOURCE: &str = "Open-Meteo API (https://open-meteo.com)";
