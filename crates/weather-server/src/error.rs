//! Error mapping at the HTTP edge.
//!
//! Every failure kind crossing out of the components is translated to a
//! status family here: auth kinds to 401/403/503, caller errors to
//! 400/404, upstream trouble to 503. Bodies are a stable
//! `{"error": {"message", "code"}}` shape so clients can branch on
//! `code` without parsing prose.

use auth_gate::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tool_registry::{HandlerErrorKind, ToolError};

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "request failed");
        } else {
            tracing::debug!(code = self.code, message = %self.message, "request rejected");
        }
        let body = serde_json::json!({
            "error": {
                "message": self.message,
                "code": self.code,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match &e {
            AuthError::MissingCredential => {
                Self::new(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", e.to_string())
            }
            AuthError::Rejected(_) => {
                Self::new(StatusCode::FORBIDDEN, "UNAUTHORIZED", e.to_string())
            }
            AuthError::Unavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "AUTH_UNAVAILABLE",
                e.to_string(),
            ),
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(e: ToolError) -> Self {
        match &e {
            ToolError::MissingParameter(_) | ToolError::InvalidParameter { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENTS", e.to_string())
            }
            ToolError::NotFound(_) | ToolError::Duplicate(_) => Self::new(
                StatusCode::NOT_FOUND,
                "UNKNOWN_TOOL",
                e.to_string(),
            ),
            ToolError::Handler { kind, message } => match kind {
                HandlerErrorKind::NotFound => {
                    Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message.clone())
                }
                HandlerErrorKind::InvalidInput => {
                    Self::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENTS", message.clone())
                }
                HandlerErrorKind::Unavailable => Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UPSTREAM_ERROR",
                    message.clone(),
                ),
                HandlerErrorKind::Internal => Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    message.clone(),
                ),
            },
            ToolError::Json(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                e.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_kinds_map_to_their_status_family() {
        assert_eq!(
            ApiError::from(AuthError::MissingCredential).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Rejected("bad".to_string())).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::Unavailable("down".to_string())).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn caller_errors_are_4xx_and_upstream_is_503() {
        assert_eq!(
            ApiError::from(ToolError::MissingParameter("location".to_string())).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ToolError::handler(
                HandlerErrorKind::NotFound,
                "location not found"
            ))
            .status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ToolError::handler(HandlerErrorKind::Unavailable, "api down")).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
