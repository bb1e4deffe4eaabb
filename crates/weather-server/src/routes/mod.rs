//! Route handlers for the HTTP transport.

pub mod geocode;
pub mod health;
pub mod weather;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the router with all routes.
///
/// `/` and `/health` are reachable without a credential; the tool
/// routes sit behind the auth gate. Liveness reports process health
/// only — it never consults downstream services, so a provider outage
/// cannot flap it.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/weather",
            get(weather::get_weather).post(weather::post_weather),
        )
        .route(
            "/geocode",
            get(geocode::get_geocode).post(geocode::post_geocode),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(health::service_info))
        .route("/health", get(health::health))
        .merge(protected)
        .with_state(state)
}

/// Middleware gating protected routes on a bearer credential.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = bearer_token(request.headers());
    state.auth.validate(credential.as_deref()).await?;
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    Some(token.to_string())
}
