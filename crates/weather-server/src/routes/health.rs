//! Liveness and service-information endpoints (no authentication).

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct Health {
    pub success: bool,
    pub status: String,
    pub version: String,
}

/// Health check endpoint for monitors and load balancers.
///
/// Reports process liveness only; downstream outages do not fail it.
pub async fn health() -> Json<Health> {
    Json(Health {
        success: true,
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Root endpoint describing the service and its routes.
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "name": "weather-server",
        "version": env!("CARGO_PKG_VERSION"),
        "data_source": weather_core::DATA_SOURCE,
        "endpoints": {
            "health": "/health (no auth)",
            "weather": "/weather?location=<city> (auth required)",
            "geocode": "/geocode?location=<city> (auth required)",
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_always_reports_ok() {
        let Json(body) = health().await;
        assert!(body.success);
        assert_eq!(body.status, "ok");
    }
}
