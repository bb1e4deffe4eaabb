//! The weather tools both transports expose.

use std::sync::Arc;

use async_trait::async_trait;
use tool_registry::{
    HandlerErrorKind, ParamKind, ParamSpec, Tool, ToolArgs, ToolError, ToolOutput, ToolRegistry,
};
use tracing::warn;
use weather_data::{WeatherError, WeatherService};

pub const WEATHER_TOOL: &str = "get_hourly_weather";
pub const GEOCODE_TOOL: &str = "geocode_location";

const LOCATION_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "location",
    kind: ParamKind::String,
    required: true,
    description: "City name or location identifier, e.g. \"London\" or \"Paris, France\"",
}];

fn map_weather_error(e: WeatherError) -> ToolError {
    let kind = match &e {
        WeatherError::InvalidLocation(_) => HandlerErrorKind::InvalidInput,
        WeatherError::LocationNotFound(_) => HandlerErrorKind::NotFound,
        WeatherError::Upstream(_) => HandlerErrorKind::Unavailable,
    };
    ToolError::handler(kind, e.to_string())
}

/// Current conditions plus a 12-hour forecast for a location.
pub struct HourlyWeatherTool {
    service: Arc<WeatherService>,
}

#[async_trait]
impl Tool for HourlyWeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL
    }

    fn description(&self) -> &str {
        "Get current conditions and a 12-hour forecast for a location. \
         Accepts a city name, optionally qualified with a state or country \
         (e.g. \"Paris, France\"). Temperatures in °C, wind in km/h; \
         weather descriptions in plain English. Data from the free \
         Open-Meteo API."
    }

    fn parameters(&self) -> &[ParamSpec] {
        LOCATION_PARAMS
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let location = args.get_string("location")?;
        match self.service.get_weather(&location).await {
            Ok(report) => ToolOutput::json(&report),
            Err(e) => {
                warn!(location = %location, error = %e, "weather lookup failed");
                Err(map_weather_error(e))
            }
        }
    }
}

/// Coordinates and timezone for a location, without weather data.
pub struct GeocodeLocationTool {
    service: Arc<WeatherService>,
}

#[async_trait]
impl Tool for GeocodeLocationTool {
    fn name(&self) -> &str {
        GEOCODE_TOOL
    }

    fn description(&self) -> &str {
        "Resolve a city or address into geographic coordinates and a \
         timezone. Useful for mapping, travel planning, and local time \
         calculations."
    }

    fn parameters(&self) -> &[ParamSpec] {
        LOCATION_PARAMS
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let location = args.get_string("location")?;
        match self.service.geocode(&location).await {
            Ok(entry) => ToolOutput::json(&serde_json::json!({
                "location": entry.location.name,
                "country": entry.location.country,
                "coordinates": {
                    "latitude": entry.location.latitude,
                    "longitude": entry.location.longitude,
                },
                "timezone": entry.location.timezone,
            })),
            Err(e) => {
                warn!(location = %location, error = %e, "geocoding failed");
                Err(map_weather_error(e))
            }
        }
    }
}

/// Register every tool this service exposes. Called once at startup;
/// the composing binary is the only place that decides the tool set.
pub fn register_tools(
    registry: &mut ToolRegistry,
    service: Arc<WeatherService>,
) -> Result<(), ToolError> {
    registry.register(HourlyWeatherTool {
        service: service.clone(),
    })?;
    registry.register(GeocodeLocationTool { service })?;
    Ok(())
}
