//! Parameter schemas and argument validation.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::error::ToolError;

/// Primitive type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

impl ParamKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// Declaration of one tool parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// Render a parameter list as a JSON Schema object, the shape the
/// message-channel protocol advertises in `tools/list`.
pub(crate) fn input_schema(specs: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for spec in specs {
        properties.insert(
            spec.name.to_string(),
            json!({
                "type": spec.kind.json_type(),
                "description": spec.description,
            }),
        );
    }
    let required: Vec<&str> = specs
        .iter()
        .filter(|s| s.required)
        .map(|s| s.name)
        .collect();
    json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    })
}

/// Check arguments against a parameter list.
///
/// Required fields must be present and non-null; present fields must
/// match their declared primitive type. Fields not named by any spec
/// are deliberately ignored (forward-compatible: newer clients may send
/// parameters this server does not know yet).
pub(crate) fn validate_args(
    specs: &[ParamSpec],
    args: &HashMap<String, Value>,
) -> Result<(), ToolError> {
    for spec in specs {
        match args.get(spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(ToolError::MissingParameter(spec.name.to_string()));
                }
            }
            Some(value) => {
                if !spec.kind.matches(value) {
                    return Err(ToolError::InvalidParameter {
                        name: spec.name.to_string(),
                        reason: format!("expected {}", spec.kind.json_type()),
                    });
                }
            }
        }
    }
    Ok(())
}
