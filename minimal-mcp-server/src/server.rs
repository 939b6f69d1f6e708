use crate::rpc::{RpcRequest, RpcResponse};
use crate::tools::Tool;
use crate::{PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("stdio failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Stateless request handler for the three built-in tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct McpServer;

impl McpServer {
    pub fn new() -> Self {
        Self
    }

    /// Handle one line of input. Returns the serialized reply, if any.
    pub fn handle_message(&self, line: &str) -> Result<Option<String>, ServerError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let response = match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => self.handle_value(value),
            Err(err) => {
                warn!(error = %err, "Discarding unparseable message");
                Some(RpcResponse::parse_error(format!("Parse error: {err}")))
            }
        };
        response
            .map(|response| serde_json::to_string(&response))
            .transpose()
            .map_err(ServerError::from)
    }

    fn handle_value(&self, value: Value) -> Option<RpcResponse> {
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let has_method = value.get("method").is_some();

        let request = match serde_json::from_value::<RpcRequest>(value) {
            Ok(request) => request,
            Err(err) => {
                return Some(RpcResponse::invalid_request(
                    id,
                    format!("Invalid request: {err}"),
                ));
            }
        };

        if !has_method {
            // A response to something we never sent; nothing to answer.
            debug!(id = ?request.id, "Ignoring message without method");
            return None;
        }
        if request.jsonrpc != "2.0" || request.method.is_empty() {
            return Some(RpcResponse::invalid_request(
                id,
                "Invalid request: expected jsonrpc 2.0 with a method",
            ));
        }
        if request.is_notification() {
            debug!(method = %request.method, "Received notification");
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        let params = request.params.unwrap_or(Value::Null);
        debug!(method = %request.method, "Handling request");
        let response = match request.method.as_str() {
            "initialize" => RpcResponse::success(id, initialize_result(&params)),
            "ping" => RpcResponse::success(id, json!({})),
            "tools/list" => RpcResponse::success(id, tools_list_result()),
            "tools/call" => tools_call(id, &params),
            other => {
                warn!(method = other, "Unknown method");
                RpcResponse::method_not_found(id, other)
            }
        };
        Some(response)
    }
}

fn initialize_result(params: &Value) -> Value {
    let protocol = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);
    if let Some(client) = params.get("clientInfo").and_then(|info| info.get("name")) {
        info!(client = %client, protocol, "Client connected");
    }
    json!({
        "protocolVersion": protocol,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION }
    })
}

fn tools_list_result() -> Value {
    let tools: Vec<Value> = Tool::ALL.iter().map(|tool| tool.definition()).collect();
    json!({ "tools": tools })
}

fn tools_call(id: Value, params: &Value) -> RpcResponse {
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return RpcResponse::invalid_params(id, "tools/call requires a tool name");
    };
    let Some(tool) = Tool::from_name(name) else {
        warn!(tool = name, "Unknown tool requested");
        return RpcResponse::invalid_params(id, format!("Unknown tool: {name}"));
    };

    let empty = json!({});
    let arguments = params.get("arguments").unwrap_or(&empty);
    match tool.invoke(arguments) {
        Ok(text) => {
            info!(tool = name, "Tool call succeeded");
            RpcResponse::success(id, text_result(text, false))
        }
        Err(err) => {
            warn!(tool = name, error = %err, "Tool call rejected");
            RpcResponse::success(id, text_result(format!("Error: {err}"), true))
        }
    }
}

fn text_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}

/// Serve newline-delimited JSON-RPC from `reader` until end of input.
pub async fn serve<R, W>(mut reader: R, mut writer: W) -> Result<(), ServerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let server = McpServer::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        // invalid UTF-8 is replaced rather than ending the session
        let line = String::from_utf8_lossy(&buf);
        if let Some(reply) = server.handle_message(&line)? {
            writer.write_all(reply.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }
    info!("Input closed, shutting down");
    Ok(())
}
