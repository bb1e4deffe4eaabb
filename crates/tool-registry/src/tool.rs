//! Tool trait definition and argument/output types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::ToolError;
use crate::schema::ParamSpec;

/// Arguments passed to a tool for execution.
///
/// By the time a handler sees these, the registry has already checked
/// them against the tool's schema, so the typed accessors only fail on
/// optional parameters a handler chose to require anyway.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Parameters as key-value pairs.
    pub params: HashMap<String, Value>,
}

impl ToolArgs {
    pub fn new(params: HashMap<String, Value>) -> Self {
        Self { params }
    }

    /// Get a string parameter, or an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get an optional string parameter.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params.get(key)?.as_str().map(str::to_string)
    }

    /// Get an f64 parameter, or an error if missing or not a number.
    pub fn get_f64(&self, key: &str) -> Result<f64, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_f64()
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected number".to_string(),
            })
    }

    /// Get an optional boolean parameter with a default.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.params
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

/// Structured output from a tool execution.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    /// The result as a JSON value; transports re-encode it as needed
    /// (an HTTP body, or text content on the message channel).
    pub value: Value,
}

impl ToolOutput {
    /// Build an output from any serializable result.
    pub fn json<T: Serialize>(result: &T) -> Result<Self, ToolError> {
        Ok(Self {
            value: serde_json::to_value(result)?,
        })
    }

    /// Render the output as pretty JSON text for text-only consumers.
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(&self.value).unwrap_or_else(|_| self.value.to_string())
    }
}

/// Trait for operations invocable through either transport.
///
/// Implementations close over whatever business services they need
/// (injected at construction); the registry owns dispatch, validation,
/// and discovery metadata.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Declared parameters, used for validation and discovery.
    fn parameters(&self) -> &[ParamSpec];

    /// Execute the tool with validated arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}
