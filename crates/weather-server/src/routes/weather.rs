//! Weather forecast endpoints.
//!
//! Thin adapters over the tool registry: the same `get_hourly_weather`
//! tool the message channel invokes, reachable as a REST route. The
//! location is accepted either as a query parameter (GET) or a JSON
//! body (POST).

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::tools::WEATHER_TOOL;

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub location: String,
}

/// `GET /weather?location=<city>`
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<Value>, ApiError> {
    invoke(&state, params).await
}

/// `POST /weather` with `{"location": "<city>"}`
pub async fn post_weather(
    State(state): State<AppState>,
    Json(params): Json<WeatherParams>,
) -> Result<Json<Value>, ApiError> {
    invoke(&state, params).await
}

async fn invoke(state: &AppState, params: WeatherParams) -> Result<Json<Value>, ApiError> {
    info!(location = %params.location, "weather request");
    let mut args = HashMap::new();
    args.insert("location".to_string(), Value::String(params.location));
    let output = state.registry.invoke(WEATHER_TOOL, args).await?;
    Ok(Json(output.value))
}
