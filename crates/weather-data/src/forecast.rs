//! Open-Meteo forecast client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::WeatherError;

/// Open-Meteo forecast endpoint (free, no API key).
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,weather_code,wind_speed_10m,wind_direction_10m";
const HOURLY_VARIABLES: &str =
    "temperature_2m,precipitation_probability,precipitation,weather_code,wind_speed_10m";

/// Raw forecast payload from the provider.
///
/// The hourly block is column-oriented (parallel arrays indexed by
/// time); the aggregator zips it into per-hour rows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastData {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub current: CurrentData,
    #[serde(default)]
    pub hourly: HourlyData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentData {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default)]
    pub apparent_temperature: Option<f64>,
    #[serde(default)]
    pub precipitation: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<u16>,
    #[serde(default)]
    pub wind_speed_10m: Option<f64>,
    #[serde(default)]
    pub wind_direction_10m: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlyData {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub weather_code: Vec<Option<u16>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
}

/// Fetches conditions for a pair of coordinates.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        timezone: &str,
    ) -> Result<ForecastData, WeatherError>;
}

/// HTTP client for the Open-Meteo forecast API.
pub struct ForecastClient {
    http: Client,
    url: String,
}

impl ForecastClient {
    pub fn new(url: impl Into<String>) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ForecastProvider for ForecastClient {
    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        timezone: &str,
    ) -> Result<ForecastData, WeatherError> {
        let latitude = latitude.to_string();
        let longitude = longitude.to_string();
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_VARIABLES),
                ("hourly", HOURLY_VARIABLES),
                ("temperature_unit", "celsius"),
                ("wind_speed_unit", "kmh"),
                ("precipitation_unit", "mm"),
                ("timezone", timezone),
                ("forecast_days", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "weather API returned an error status");
            return Err(WeatherError::Upstream(format!(
                "weather API returned HTTP {status}"
            )));
        }

        let data: ForecastData = response.json().await?;
        debug!(latitude = %latitude, longitude = %longitude, "fetched forecast");
        Ok(data)
    }
}
