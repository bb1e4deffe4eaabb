//! Tool registry: registration, discovery, and validated dispatch.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ToolError;
use crate::schema::{input_schema, validate_args};
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Discovery metadata for one registered tool, shaped for the
/// message-channel `tools/list` reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Immutable-after-startup mapping of operation name to handler.
///
/// Registration happens once while the composing binary is wiring
/// itself; afterwards the registry is shared read-only behind an `Arc`
/// by every transport. A `BTreeMap` keeps discovery output in a stable
/// order.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Names are the dispatch key and must be unique;
    /// a second registration under the same name is a startup bug, not
    /// something to silently paper over.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::Duplicate(name));
        }
        info!(tool = %name, "registering tool");
        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    /// Names of all registered tools.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Discovery metadata for every tool, schemas included.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: input_schema(tool.parameters()),
            })
            .collect()
    }

    /// Invoke a tool by name.
    ///
    /// Arguments are validated against the tool's schema first; the
    /// handler never runs on malformed input.
    pub async fn invoke(
        &self,
        name: &str,
        params: HashMap<String, Value>,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        validate_args(tool.parameters(), &params)?;

        debug!(tool = name, params = params.len(), "invoking tool");
        let output = tool.execute(ToolArgs::new(params)).await?;
        debug!(tool = name, "tool completed");
        Ok(output)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
