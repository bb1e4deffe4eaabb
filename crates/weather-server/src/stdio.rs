//! Stdio transport: newline-delimited JSON-RPC over stdin/stdout.
//!
//! This transport owns its connection end-to-end — it is never mounted
//! inside the HTTP router. Requests are handled on their own tasks and
//! responses funneled through a single writer task, so a slow upstream
//! call on one request never blocks another and completions may arrive
//! out of order (the client correlates by request id).
//!
//! Log output goes to stderr (see `main`); stdout carries protocol
//! frames only.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use auth_gate::AuthError;
use tool_registry::ToolError;

use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, RequestId, AUTH_UNAVAILABLE, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR, UNAUTHORIZED,
};
use crate::state::AppState;

/// Serve the protocol until stdin closes or shutdown is signaled.
pub async fn serve(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(frame) = out_rx.recv().await {
            if stdout.write_all(frame.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
            {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    info!("stdio transport ready");
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("stdio transport draining");
                    break;
                }
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let state = state.clone();
                        let out = out_tx.clone();
                        tokio::spawn(async move {
                            if let Some(response) = handle_message(&state, &line).await {
                                let _ = out.send(response).await;
                            }
                        });
                    }
                    Ok(None) => {
                        info!("stdin closed, stopping stdio transport");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "failed to read stdin");
                        break;
                    }
                }
            }
        }
    }

    // Dropping our sender lets the writer drain in-flight responses
    // from tasks that already queued output, then exit.
    drop(out_tx);
    let _ = writer.await;
}

/// Handle one protocol frame. Returns `None` for notifications.
pub async fn handle_message(state: &AppState, line: &str) -> Option<String> {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            return Some(encode(JsonRpcResponse::error(
                RequestId::Null,
                PARSE_ERROR,
                format!("parse error: {e}"),
            )));
        }
    };

    // Notifications carry no id and get no reply.
    let Some(id) = request.id else {
        debug!(method = %request.method, "notification received");
        return None;
    };

    let response = match request.method.as_str() {
        "initialize" => ok_response(id, InitializeResult::current()),
        "ping" => JsonRpcResponse::result(id, json!({})),
        "tools/list" => ok_response(
            id,
            ListToolsResult {
                tools: state.registry.descriptors(),
            },
        ),
        "tools/call" => handle_tool_call(state, id, request.params).await,
        other => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("unknown method: {other}")),
    };

    Some(encode(response))
}

async fn handle_tool_call(
    state: &AppState,
    id: RequestId,
    params: Option<Value>,
) -> JsonRpcResponse {
    // The gate runs before anything touches the registry. The stdio
    // channel carries no bearer credential, so an enabled gate denies
    // every call here; configuration rejects that combination upfront.
    if let Err(e) = state.auth.validate(None).await {
        let code = match e {
            AuthError::Unavailable(_) => AUTH_UNAVAILABLE,
            AuthError::MissingCredential | AuthError::Rejected(_) => UNAUTHORIZED,
        };
        return JsonRpcResponse::error(id, code, e.to_string());
    }

    let params: CallToolParams = match params {
        Some(value) => match serde_json::from_value(value) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {e}"));
            }
        },
        None => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "missing params");
        }
    };

    let args: HashMap<String, Value> = params.arguments.unwrap_or_default().into_iter().collect();

    match state.registry.invoke(&params.name, args).await {
        Ok(output) => ok_response(id, CallToolResult::text(output.to_text())),
        Err(e @ ToolError::NotFound(_)) => {
            JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string())
        }
        Err(e) if e.is_invalid_arguments() => {
            JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string())
        }
        // Execution failures ride inside the result, flagged isError,
        // so clients see a structured error object rather than a
        // protocol-level fault.
        Err(e @ ToolError::Handler { .. }) => ok_response(id, CallToolResult::error(e.to_string())),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
    }
}

fn ok_response(id: RequestId, result: impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::result(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
    }
}

fn encode(response: JsonRpcResponse) -> String {
    serde_json::to_string(&response).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"response encoding failed"}}"#
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use auth_gate::{AuthGate, CredentialIntrospector, Introspection};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tool_registry::{ParamKind, ParamSpec, Tool, ToolArgs, ToolOutput, ToolRegistry};

    struct UppercaseTool {
        executions: Arc<AtomicUsize>,
    }

    const UPPERCASE_PARAMS: &[ParamSpec] = &[ParamSpec {
        name: "text",
        kind: ParamKind::String,
        required: true,
        description: "Text to uppercase",
    }];

    #[async_trait]
    impl Tool for UppercaseTool {
        fn name(&self) -> &str {
            "uppercase"
        }

        fn description(&self) -> &str {
            "Uppercases text"
        }

        fn parameters(&self) -> &[ParamSpec] {
            UPPERCASE_PARAMS
        }

        async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            let text = args.get_string("text")?;
            if text == "boom" {
                return Err(ToolError::handler(
                    tool_registry::HandlerErrorKind::Unavailable,
                    "backend is down",
                ));
            }
            ToolOutput::json(&json!({ "result": text.to_uppercase() }))
        }
    }

    struct AllowAll;

    #[async_trait]
    impl CredentialIntrospector for AllowAll {
        async fn introspect(&self, _credential: &str) -> Result<Introspection, auth_gate::AuthError> {
            Ok(Introspection {
                valid: true,
                subject: Some("alice".to_string()),
                scopes: Vec::new(),
            })
        }
    }

    fn test_state(auth: AuthGate) -> (AppState, Arc<AtomicUsize>) {
        let executions = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(UppercaseTool {
                executions: executions.clone(),
            })
            .unwrap();
        (
            AppState::new(Arc::new(registry), Arc::new(auth)),
            executions,
        )
    }

    fn parse(response: &str) -> Value {
        serde_json::from_str(response).unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_capabilities() {
        let (state, _) = test_state(AuthGate::disabled());
        let response = handle_message(
            &state,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await
        .unwrap();
        let value = parse(&response);
        assert_eq!(value["id"], 1);
        assert_eq!(value["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(value["result"]["serverInfo"]["name"], "weather-server");
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let (state, _) = test_state(AuthGate::disabled());
        let response = handle_message(
            &state,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn unparseable_input_yields_a_parse_error_with_null_id() {
        let (state, _) = test_state(AuthGate::disabled());
        let response = handle_message(&state, "{not json").await.unwrap();
        let value = parse(&response);
        assert_eq!(value["error"]["code"], PARSE_ERROR);
        assert_eq!(value["id"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_methods_are_rejected() {
        let (state, _) = test_state(AuthGate::disabled());
        let response = handle_message(
            &state,
            r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#,
        )
        .await
        .unwrap();
        assert_eq!(parse(&response)["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn tools_list_exposes_schemas() {
        let (state, _) = test_state(AuthGate::disabled());
        let response =
            handle_message(&state, r#"{"jsonrpc":"2.0","id":3,"method":"tools/list"}"#)
                .await
                .unwrap();
        let value = parse(&response);
        let tools = value["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "uppercase");
        assert_eq!(tools[0]["inputSchema"]["required"][0], "text");
    }

    #[tokio::test]
    async fn tool_call_returns_text_content() {
        let (state, _) = test_state(AuthGate::disabled());
        let response = handle_message(
            &state,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"uppercase","arguments":{"text":"hi"}}}"#,
        )
        .await
        .unwrap();
        let value = parse(&response);
        assert_eq!(value["result"]["isError"], false);
        let text = value["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("HI"));
    }

    #[tokio::test]
    async fn missing_argument_is_an_invalid_params_error() {
        let (state, executions) = test_state(AuthGate::disabled());
        let response = handle_message(
            &state,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"uppercase","arguments":{}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(parse(&response)["error"]["code"], INVALID_PARAMS);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_failures_become_error_results_not_protocol_faults() {
        let (state, _) = test_state(AuthGate::disabled());
        let response = handle_message(
            &state,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"uppercase","arguments":{"text":"boom"}}}"#,
        )
        .await
        .unwrap();
        let value = parse(&response);
        assert!(value.get("error").is_none());
        assert_eq!(value["result"]["isError"], true);
    }

    #[tokio::test]
    async fn enabled_gate_blocks_credentialless_calls_before_the_handler() {
        let gate = AuthGate::new(Arc::new(AllowAll), Duration::from_secs(60));
        let (state, executions) = test_state(gate);
        let response = handle_message(
            &state,
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"uppercase","arguments":{"text":"hi"}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(parse(&response)["error"]["code"], UNAUTHORIZED);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }
}
