//! Application state shared across transports and handlers.

use std::sync::Arc;

use auth_gate::AuthGate;
use tool_registry::ToolRegistry;

/// Shared application state.
///
/// Both transports hold the same registry and the same gate, so a tool
/// behaves identically no matter how it was reached. Everything is
/// constructed once in `main` and injected here — no ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Registered tools (read-only after startup).
    pub registry: Arc<ToolRegistry>,
    /// Pre-invocation authentication gate.
    pub auth: Arc<AuthGate>,
}

impl AppState {
    pub fn new(registry: Arc<ToolRegistry>, auth: Arc<AuthGate>) -> Self {
        Self { registry, auth }
    }
}
