//! HTTP transport tests: routing, the auth gate, and error mapping,
//! exercised against the real router with stubbed business backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use auth_gate::{AuthError, AuthGate, CredentialIntrospector, Introspection};
use tool_registry::{
    HandlerErrorKind, ParamKind, ParamSpec, Tool, ToolArgs, ToolError, ToolOutput, ToolRegistry,
};
use weather_server::routes;
use weather_server::state::AppState;
use weather_server::tools::{GEOCODE_TOOL, WEATHER_TOOL};

const LOCATION_PARAMS: &[ParamSpec] = &[ParamSpec {
    name: "location",
    kind: ParamKind::String,
    required: true,
    description: "City name",
}];

/// Stands in for the weather pipeline: fixed answers per location.
struct StubTool {
    name: &'static str,
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "stub"
    }

    fn parameters(&self) -> &[ParamSpec] {
        LOCATION_PARAMS
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let location = args.get_string("location")?;
        match location.as_str() {
            "Atlantis" => Err(ToolError::handler(
                HandlerErrorKind::NotFound,
                "location not found: Atlantis",
            )),
            "Outage" => Err(ToolError::handler(
                HandlerErrorKind::Unavailable,
                "weather API returned HTTP 500",
            )),
            _ => ToolOutput::json(&json!({ "location": location, "temperature": 21.5 })),
        }
    }
}

enum Identity {
    Allow,
    Reject,
    Down,
}

struct StubIntrospector(Identity);

#[async_trait]
impl CredentialIntrospector for StubIntrospector {
    async fn introspect(&self, _credential: &str) -> Result<Introspection, AuthError> {
        match self.0 {
            Identity::Allow => Ok(Introspection {
                valid: true,
                subject: Some("alice".to_string()),
                scopes: Vec::new(),
            }),
            Identity::Reject => Ok(Introspection {
                valid: false,
                subject: None,
                scopes: Vec::new(),
            }),
            Identity::Down => Err(AuthError::Unavailable("connection refused".to_string())),
        }
    }
}

fn app(identity: Identity) -> Router {
    let mut registry = ToolRegistry::new();
    registry.register(StubTool { name: WEATHER_TOOL }).unwrap();
    registry.register(StubTool { name: GEOCODE_TOOL }).unwrap();
    let auth = AuthGate::new(Arc::new(StubIntrospector(identity)), Duration::from_secs(60));
    routes::router(AppState::new(Arc::new(registry), Arc::new(auth)))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_needs_no_credential_and_never_checks_downstreams() {
    // Identity service down, yet liveness still answers.
    let response = app(Identity::Down)
        .oneshot(get("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn service_info_is_public() {
    let response = app(Identity::Allow).oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_credential_is_unauthenticated() {
    let response = app(Identity::Allow)
        .oneshot(get("/weather?location=Oslo", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn valid_credential_reaches_the_tool() {
    let response = app(Identity::Allow)
        .oneshot(get("/weather?location=Oslo", Some("good-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["location"], "Oslo");
}

#[tokio::test]
async fn post_body_is_accepted_like_query_parameters() {
    let request = Request::builder()
        .method("POST")
        .uri("/weather")
        .header(header::AUTHORIZATION, "Bearer good-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"location": "Oslo"}"#))
        .unwrap();
    let response = app(Identity::Allow).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["location"], "Oslo");
}

#[tokio::test]
async fn rejected_credential_is_unauthorized() {
    let response = app(Identity::Reject)
        .oneshot(get("/weather?location=Oslo", Some("revoked-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unreachable_identity_service_is_503_never_an_allow() {
    let response = app(Identity::Down)
        .oneshot(get("/weather?location=Oslo", Some("token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "AUTH_UNAVAILABLE");
}

#[tokio::test]
async fn unknown_location_maps_to_404() {
    let response = app(Identity::Allow)
        .oneshot(get("/weather?location=Atlantis", Some("good-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn provider_outage_maps_to_503() {
    let response = app(Identity::Allow)
        .oneshot(get("/weather?location=Outage", Some("good-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn missing_location_parameter_is_a_client_error() {
    let response = app(Identity::Allow)
        .oneshot(get("/weather", Some("good-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn geocode_route_shares_the_gate_and_registry() {
    let response = app(Identity::Allow)
        .oneshot(get("/geocode?location=Oslo", Some("good-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(Identity::Allow)
        .oneshot(get("/geocode?location=Oslo", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
