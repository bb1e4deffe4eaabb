//! Error types for tool registration and invocation.

use thiserror::Error;

/// Coarse failure kinds a tool handler can report.
///
/// The registry stays ignorant of any particular domain; handlers fold
/// their own errors into one of these kinds so transports can map a
/// failure to a status code without downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerErrorKind {
    /// The caller's input names something that does not exist.
    NotFound,
    /// A dependency of the handler is temporarily unavailable.
    Unavailable,
    /// The input passed schema validation but is semantically unusable.
    InvalidInput,
    /// Anything else.
    Internal,
}

/// Errors that can occur during tool registration or invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool not found in the registry.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// A tool with this name is already registered.
    #[error("tool already registered: {0}")]
    Duplicate(String),

    /// Missing required parameter.
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// Parameter present but of the wrong type or shape.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The handler ran and failed.
    #[error("{message}")]
    Handler {
        kind: HandlerErrorKind,
        message: String,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    pub fn handler(kind: HandlerErrorKind, message: impl Into<String>) -> Self {
        Self::Handler {
            kind,
            message: message.into(),
        }
    }

    /// Whether this error is the caller's fault (bad arguments).
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_) | Self::InvalidParameter { .. }
        )
    }
}
