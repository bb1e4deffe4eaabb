//! Geocoding endpoints: location resolution without weather data.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::tools::GEOCODE_TOOL;

#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    pub location: String,
}

/// `GET /geocode?location=<city>`
pub async fn get_geocode(
    State(state): State<AppState>,
    Query(params): Query<GeocodeParams>,
) -> Result<Json<Value>, ApiError> {
    invoke(&state, params).await
}

/// `POST /geocode` with `{"location": "<city>"}`
pub async fn post_geocode(
    State(state): State<AppState>,
    Json(params): Json<GeocodeParams>,
) -> Result<Json<Value>, ApiError> {
    invoke(&state, params).await
}

async fn invoke(state: &AppState, params: GeocodeParams) -> Result<Json<Value>, ApiError> {
    info!(location = %params.location, "geocode request");
    let mut args = HashMap::new();
    args.insert("location".to_string(), Value::String(params.location));
    let output = state.registry.invoke(GEOCODE_TOOL, args).await?;
    Ok(Json(output.value))
}
