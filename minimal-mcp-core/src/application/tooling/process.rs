use super::error::ToolInvokeError;
use super::interface::ServerToolInfo;
use crate::config::ServerConfig;
use crate::constants::PROTOCOL_VERSION;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

type Reply = Result<Value, ToolInvokeError>;

/// One stdio MCP server: a child process speaking newline-delimited JSON-RPC.
#[derive(Clone)]
pub struct McpProcess {
    inner: Arc<McpProcessInner>,
}

struct McpProcessInner {
    server: ServerConfig,
    /// Serializes start-up so concurrent first uses spawn one child.
    start_lock: AsyncMutex<()>,
    state: AsyncMutex<Option<RunningState>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: AsyncMutex<HashMap<String, oneshot::Sender<Reply>>>,
    id_counter: AtomicU64,
    generation: AtomicU64,
    instructions: AsyncMutex<Option<String>>,
    tool_cache: AsyncMutex<Vec<ServerToolInfo>>,
}

struct RunningState {
    child: Child,
    generation: u64,
}

/// What a line read from the server turned out to be.
enum Inbound {
    Response { id: Value, body: Value },
    Request { id: Value, method: String },
    Notification { method: String },
    Ignored,
}

impl Inbound {
    fn classify(message: Value) -> Self {
        let method = message
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_string);
        match (message.get("id").cloned(), method) {
            (Some(id), Some(method)) => Inbound::Request { id, method },
            (Some(id), None) => Inbound::Response { id, body: message },
            (None, Some(method)) => Inbound::Notification { method },
            (None, None) => Inbound::Ignored,
        }
    }
}

impl McpProcess {
    pub fn new(server: ServerConfig) -> Self {
        Self {
            inner: Arc::new(McpProcessInner {
                server,
                start_lock: AsyncMutex::new(()),
                state: AsyncMutex::new(None),
                writer: AsyncMutex::new(None),
                pending: AsyncMutex::new(HashMap::new()),
                id_counter: AtomicU64::new(1),
                generation: AtomicU64::new(0),
                instructions: AsyncMutex::new(None),
                tool_cache: AsyncMutex::new(Vec::new()),
            }),
        }
    }

    pub(super) async fn ensure_running(&self) -> Result<(), ToolInvokeError> {
        self.inner.ensure_running().await
    }

    pub(super) async fn call_tool(
        &self,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, ToolInvokeError> {
        self.ensure_running().await?;
        self.inner.call_tool(tool, arguments).await
    }

    pub(super) async fn instructions(&self) -> Option<String> {
        self.inner.instructions.lock().await.clone()
    }

    pub(super) async fn tools(&self) -> Vec<ServerToolInfo> {
        self.inner.tool_cache.lock().await.clone()
    }

    pub(super) async fn shutdown(&self) {
        self.inner.stop(None).await;
    }
}

impl McpProcessInner {
    async fn ensure_running(self: &Arc<Self>) -> Result<(), ToolInvokeError> {
        let _starting = self.start_lock.lock().await;
        if self.state.lock().await.is_some() {
            return Ok(());
        }

        let mut command = Command::new(&self.server.command);
        command
            .args(&self.server.args)
            .envs(&self.server.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.server.workdir {
            command.current_dir(dir);
        }

        debug!(
            server = %self.server.name,
            command = %self.server.command.display(),
            "Spawning MCP server process"
        );
        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: self.server.name.clone(),
            source,
        })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(self.transport_error("failed to capture server stdio"));
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.lock().await = Some(RunningState { child, generation });
        *self.writer.lock().await = Some(BufWriter::new(stdin));
        tokio::spawn(Arc::clone(self).reader_loop(stdout, generation));

        if let Err(err) = self.initialize_sequence().await {
            self.stop(Some(generation)).await;
            return Err(err);
        }
        info!(server = %self.server.name, generation, "MCP server initialised");
        Ok(())
    }

    async fn initialize_sequence(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "title": "Minimal MCP Launcher"
            },
            "capabilities": {}
        });
        let init_result = self.send_request("initialize", params).await?;
        if let Some(text) = init_result.get("instructions").and_then(Value::as_str) {
            *self.instructions.lock().await = Some(text.to_string());
        }
        self.send_message(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized",
            "params": {}
        }))
        .await?;
        self.refresh_tools().await
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };
        self.send_request("tools/call", json!({ "name": tool, "arguments": arguments }))
            .await
    }

    async fn refresh_tools(&self) -> Result<(), ToolInvokeError> {
        let result = self.send_request("tools/list", json!({})).await?;
        let tools = parse_tool_list(&result);
        debug!(server = %self.server.name, tool_count = tools.len(), "Refreshed tool catalogue");
        *self.tool_cache.lock().await = tools;
        Ok(())
    }

    /// Dispatch server output until stdout closes, then stop this generation.
    async fn reader_loop(self: Arc<Self>, stdout: ChildStdout, generation: u64) {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => {
                    warn!(server = %self.server.name, %err, "Failed to read from MCP server");
                    break;
                }
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            // servers sometimes log coloured text to stdout
            if line.is_empty() || line.starts_with('\u{1b}') {
                continue;
            }
            let message = match serde_json::from_str::<Value>(line) {
                Ok(message) => message,
                Err(err) => {
                    warn!(server = %self.server.name, line, %err, "Skipping non-JSON line from MCP server");
                    continue;
                }
            };
            if let Err(err) = self.dispatch(Inbound::classify(message)).await {
                warn!(server = %self.server.name, %err, "Failed to handle MCP server message");
            }
        }

        debug!(server = %self.server.name, generation, "MCP server stdout closed");
        self.stop(Some(generation)).await;
    }

    async fn dispatch(self: &Arc<Self>, inbound: Inbound) -> Result<(), ToolInvokeError> {
        match inbound {
            Inbound::Response { id, body } => {
                self.complete(&id, body).await;
                Ok(())
            }
            Inbound::Request { id, method } if method == "ping" => {
                self.send_message(json!({ "jsonrpc": "2.0", "id": id, "result": {} }))
                    .await
            }
            Inbound::Request { id, method } => {
                warn!(server = %self.server.name, method = %method, "Rejecting unsupported server request");
                self.send_message(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {
                        "code": -32601,
                        "message": format!("client does not implement method '{method}'")
                    }
                }))
                .await
            }
            Inbound::Notification { method } => {
                debug!(server = %self.server.name, method = %method, "Received server notification");
                if method == "notifications/tools/list_changed" {
                    // the tools/list reply arrives through this loop, so refresh elsewhere
                    let inner = Arc::clone(self);
                    tokio::spawn(async move {
                        if let Err(err) = inner.refresh_tools().await {
                            warn!(server = %inner.server.name, %err, "Failed to refresh tool catalogue");
                        }
                    });
                }
                Ok(())
            }
            Inbound::Ignored => Ok(()),
        }
    }

    /// Hand a response to whoever is waiting on its id.
    async fn complete(&self, id: &Value, body: Value) {
        let waiter = match response_key(id) {
            Some(key) => self.pending.lock().await.remove(&key),
            None => None,
        };
        let Some(waiter) = waiter else {
            debug!(server = %self.server.name, ?id, "Dropping response to unknown request");
            return;
        };

        let reply = match body.get("error") {
            None => Ok(body.get("result").cloned().unwrap_or(Value::Null)),
            Some(error) => Err(ToolInvokeError::Rpc {
                server: self.server.name.clone(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or(-32000),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            }),
        };
        let _ = waiter.send(reply);
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = format!("req-{}", self.id_counter.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let request = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        if let Err(err) = self.send_message(request).await {
            self.pending.lock().await.remove(&id);
            return Err(err);
        }

        rx.await.unwrap_or_else(|_| {
            Err(ToolInvokeError::Cancelled {
                server: self.server.name.clone(),
            })
        })
    }

    async fn send_message(&self, message: Value) -> Result<(), ToolInvokeError> {
        let mut line = serde_json::to_vec(&message).map_err(|source| ToolInvokeError::InvalidJson {
            server: self.server.name.clone(),
            source,
        })?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or_else(|| self.transport_error("server is not running"))?;
        stream
            .write_all(&line)
            .await
            .map_err(|err| self.transport_error(err.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|err| self.transport_error(err.to_string()))
    }

    /// Stop the child and fail outstanding requests.
    ///
    /// With `Some(generation)` only that child is stopped, so a reader from an
    /// earlier child cannot tear down its replacement.
    async fn stop(&self, generation: Option<u64>) {
        let running = {
            let mut state = self.state.lock().await;
            let current = state.as_ref().map(|running| running.generation);
            match (generation, current) {
                (Some(_), None) => return,
                (Some(expected), Some(current)) if expected != current => return,
                _ => state.take(),
            }
        };

        self.writer.lock().await.take();
        if let Some(mut running) = running {
            if let Err(err) = running.child.kill().await {
                debug!(server = %self.server.name, %err, "MCP server process already exited");
            }
            let _ = running.child.wait().await;
            debug!(server = %self.server.name, generation = running.generation, "MCP server process stopped");
        }

        for (_, waiter) in self.pending.lock().await.drain() {
            let _ = waiter.send(Err(ToolInvokeError::Terminated {
                server: self.server.name.clone(),
            }));
        }
        self.tool_cache.lock().await.clear();
        self.instructions.lock().await.take();
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.server.name.clone(),
            message: message.into(),
        }
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

fn parse_tool_list(result: &Value) -> Vec<ServerToolInfo> {
    let Some(array) = result.get("tools").and_then(Value::as_array) else {
        return Vec::new();
    };
    array
        .iter()
        .filter_map(|tool| {
            let name = tool.get("name").and_then(Value::as_str)?;
            Some(ServerToolInfo {
                name: name.to_string(),
                description: tool
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                input_schema: tool.get("inputSchema").cloned(),
            })
        })
        .collect()
}

/// Spawn an MCP server process, list its tools and stop it again.
pub async fn spawn_and_list_tools(
    config: &ServerConfig,
) -> Result<Vec<ServerToolInfo>, ToolInvokeError> {
    let process = McpProcess::new(config.clone());
    process.ensure_running().await?;
    let tools = process.tools().await;
    process.shutdown().await;
    Ok(tools)
}
