//! Named, schema-validated operations ("tools") shared by both
//! transports.
//!
//! A [`Tool`] is a closed unit: a unique name, a human description, a
//! typed parameter schema, and an async handler. The [`ToolRegistry`]
//! holds the full set — registered once at startup — and is the single
//! source of truth for what the service can do, regardless of whether a
//! call arrives over the message channel or HTTP.
//!
//! Arguments are validated against the schema *before* the handler
//! runs: a missing required field or a wrong primitive type never
//! reaches business code. Unknown extra fields are ignored so older
//! servers accept newer clients.

mod error;
mod registry;
mod schema;
mod tool;

pub use error::{HandlerErrorKind, ToolError};
pub use registry::{ToolDescriptor, ToolRegistry};
pub use schema::{ParamKind, ParamSpec};
pub use tool::{Tool, ToolArgs, ToolOutput};

// Re-export async_trait for tool implementations.
pub use async_trait::async_trait;
