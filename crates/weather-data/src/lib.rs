//! Open-Meteo provider clients and the weather aggregation pipeline.
//!
//! [`GeocodingClient`] and [`ForecastClient`] wrap the two Open-Meteo
//! endpoints (both free, no API key). [`WeatherService`] composes them
//! with the location cache into the end-to-end pipeline both tools call:
//! resolve → fetch → translate → assemble.

mod error;
mod forecast;
mod geocoding;
mod service;

pub use error::WeatherError;
pub use forecast::{
    CurrentData, ForecastClient, ForecastData, ForecastProvider, HourlyData, DEFAULT_FORECAST_URL,
};
pub use geocoding::{GeocodingClient, DEFAULT_GEOCODING_URL};
pub use service::{WeatherService, FORECAST_HOURS, MAX_LOCATION_LEN};
