//! MCP server for the HackMD note tools.
//!
//! Implements the JSON-RPC 2.0 protocol over stdio, exposing the six note
//! tools to MCP clients such as Claude Desktop. Requests arrive one per
//! line on stdin; responses leave one per line on stdout. All logging
//! goes to stderr so it never corrupts the protocol stream.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use hackmd_tools::NoteToolbox;

/// MCP protocol version.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during initialization.
const SERVER_NAME: &str = "hackmd-agent";

/// MCP server exposing the note toolbox over stdio.
pub struct McpServer {
    toolbox: NoteToolbox,
}

/// Result type for method dispatch.
type DispatchResult = Result<Value, (i32, String)>;

impl McpServer {
    /// Creates a new MCP server around a toolbox.
    pub fn new(toolbox: NoteToolbox) -> Self {
        Self { toolbox }
    }

    /// Runs the server until stdin closes.
    pub async fn run(&self) -> std::io::Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        info!("MCP server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            stdout.write_all(response.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        info!("stdin closed, MCP server shutting down");
        Ok(())
    }

    /// Handles one request line. Returns `None` for notifications,
    /// which get no reply.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let parsed: Result<JsonRpcRequest, _> = serde_json::from_str(line);
        match parsed {
            Ok(req) => {
                if req.method.starts_with("notifications/") {
                    debug!(method = %req.method, "Ignoring notification");
                    return None;
                }

                debug!(method = %req.method, "Processing MCP request");
                let result = self.dispatch(&req.method, req.params).await;
                Some(format_response(req.id, result))
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse request line");
                Some(format_error(None, -32700, &format!("Parse error: {e}")))
            }
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> DispatchResult {
        match method {
            "initialize" => self.handle_initialize(),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(params).await,
            "ping" => Ok(json!({})),
            other => Err((-32601, format!("Method not found: {other}"))),
        }
    }

    fn handle_initialize(&self) -> DispatchResult {
        Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        }))
    }

    fn handle_list_tools(&self) -> DispatchResult {
        let tools: Vec<Value> = self
            .toolbox
            .definitions()
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.parameters
                })
            })
            .collect();

        Ok(json!({ "tools": tools }))
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> DispatchResult {
        let params = params.ok_or((-32602, "Missing params".to_string()))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or((-32602, "Missing tool name".to_string()))?;

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let envelope = self.toolbox.execute(name, arguments).await;
        let is_error = envelope_is_error(&envelope);

        Ok(json!({
            "content": [{ "type": "text", "text": envelope }],
            "isError": is_error
        }))
    }
}

/// Checks whether a tool envelope is the error shape.
fn envelope_is_error(envelope: &str) -> bool {
    serde_json::from_str::<Value>(envelope)
        .map(|v| v.get("error").is_some())
        .unwrap_or(false)
}

/// Formats a successful response.
fn format_response(id: Option<Value>, result: DispatchResult) -> String {
    match result {
        Ok(value) => {
            let response = JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id,
                result: Some(value),
                error: None,
            };
            serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
        }
        Err((code, message)) => format_error(id, code, &message),
    }
}

/// Formats an error response.
fn format_error(id: Option<Value>, code: i32, message: &str) -> String {
    let response = JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
        }),
    };
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// Version marker required by the protocol but unused in code.
    #[serde(rename = "jsonrpc")]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}
