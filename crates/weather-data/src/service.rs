//! The aggregation pipeline: one end-to-end weather answer.

use std::sync::Arc;

use location_cache::LocationCache;
use tracing::info;
use weather_core::{
    describe_weather_code, wind_direction, CachedLocation, CurrentConditions, HourlyForecast,
    Measurement, WeatherReport, Wind, DATA_SOURCE,
};

use crate::error::WeatherError;
use crate::forecast::{CurrentData, ForecastProvider, HourlyData};

/// Forecast horizon: hourly points returned per report.
pub const FORECAST_HOURS: usize = 12;

/// Maximum accepted length of a raw location input.
pub const MAX_LOCATION_LEN: usize = 100;

/// Orchestrates location resolution and forecast fetching into a
/// [`WeatherReport`].
///
/// Reports are assembled fresh on every call; only the location
/// resolution behind them is cached. A failure after the location
/// resolved surfaces as a single upstream error — callers never see a
/// partial report.
pub struct WeatherService {
    cache: Arc<LocationCache>,
    forecast: Arc<dyn ForecastProvider>,
}

impl WeatherService {
    pub fn new(cache: Arc<LocationCache>, forecast: Arc<dyn ForecastProvider>) -> Self {
        Self { cache, forecast }
    }

    /// Resolve a location without fetching weather (the
    /// `geocode_location` tool).
    pub async fn geocode(&self, location: &str) -> Result<CachedLocation, WeatherError> {
        let location = validate_location(location)?;
        Ok(self.cache.resolve(location).await?)
    }

    /// Full pipeline: validate, resolve, fetch, translate, assemble.
    pub async fn get_weather(&self, location: &str) -> Result<WeatherReport, WeatherError> {
        let location = validate_location(location)?;
        info!(location, "fetching weather");

        let entry = self.cache.resolve(location).await?;
        let resolved = entry.location;

        let data = self
            .forecast
            .fetch(resolved.latitude, resolved.longitude, &resolved.timezone)
            .await?;

        let current_conditions = build_current(&data.current);
        let hourly_forecast = build_hourly(&data.hourly);

        let report = WeatherReport {
            location: resolved.name.clone(),
            country: resolved.country.clone(),
            coordinates: resolved.coordinates(),
            timezone: data.timezone.unwrap_or_else(|| "UTC".to_string()),
            current_conditions,
            hourly_forecast,
            data_source: DATA_SOURCE.to_string(),
        };

        info!(
            location,
            resolved = %resolved.name,
            temperature = ?report.current_conditions.temperature.value,
            weather = %report.current_conditions.weather,
            "weather report assembled"
        );
        Ok(report)
    }
}

fn validate_location(location: &str) -> Result<&str, WeatherError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::InvalidLocation(
            "location cannot be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_LOCATION_LEN {
        return Err(WeatherError::InvalidLocation(format!(
            "location name too long (max {MAX_LOCATION_LEN} characters)"
        )));
    }
    Ok(trimmed)
}

fn build_current(current: &CurrentData) -> CurrentConditions {
    CurrentConditions {
        temperature: Measurement::new(current.temperature_2m, "°C"),
        feels_like: Measurement::new(current.apparent_temperature, "°C"),
        humidity: Measurement::new(current.relative_humidity_2m, "%"),
        precipitation: Measurement::new(current.precipitation, "mm"),
        wind: Wind {
            speed: current.wind_speed_10m,
            direction_degrees: current.wind_direction_10m,
            direction: wind_direction(current.wind_direction_10m.unwrap_or(0.0)).to_string(),
            unit: "km/h".to_string(),
        },
        weather: describe_weather_code(current.weather_code.unwrap_or(0)),
        time: current.time.clone().unwrap_or_default(),
    }
}

fn build_hourly(hourly: &HourlyData) -> Vec<HourlyForecast> {
    hourly
        .time
        .iter()
        .take(FORECAST_HOURS)
        .enumerate()
        .map(|(i, time)| HourlyForecast {
            time: time.clone(),
            temperature: Measurement::new(
                hourly.temperature_2m.get(i).copied().flatten(),
                "°C",
            ),
            precipitation_probability: Measurement::new(
                hourly.precipitation_probability.get(i).copied().flatten(),
                "%",
            ),
            precipitation: Measurement::new(
                hourly.precipitation.get(i).copied().flatten(),
                "mm",
            ),
            weather: describe_weather_code(
                hourly.weather_code.get(i).copied().flatten().unwrap_or(0),
            ),
            wind_speed: Measurement::new(
                hourly.wind_speed_10m.get(i).copied().flatten(),
                "km/h",
            ),
        })
        .collect()
}
