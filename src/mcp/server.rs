use crate::app::App;
use crate::errors::{McpError, ToolError};
use crate::mcp::catalog::{tool_by_name, tool_catalog, tool_names, validate_tool_args};
use crate::mcp::envelope::{error_envelope, success_envelope};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
use crate::services::logger::Logger;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "SourceSyncAI";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct McpServer {
    app: Arc<App>,
    logger: Logger,
}

impl McpServer {
    pub fn new(app: Arc<App>) -> Self {
        let logger = app.logger.child("server");
        Self { app, logger }
    }

    pub fn from_env() -> Result<Self, ToolError> {
        let app = App::initialize()?;
        Ok(Self::new(Arc::new(app)))
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": tool_catalog() })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            return Err(McpError::invalid_params("Missing tool name"));
        }
        if tool_by_name(name).is_none() {
            return Err(unknown_tool_error(name, &tool_names()));
        }
        let args = match params.get("arguments") {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(value @ Value::Object(_)) => value.clone(),
            Some(_) => return Err(McpError::invalid_params("arguments must be an object")),
        };
        validate_tool_args(name, &args)?;

        match self.app.tool_executor.execute(name, args).await {
            Ok(result) => Ok(success_envelope(&result)),
            Err(err) => Ok(error_envelope(&err)),
        }
    }

    /// One input line in, at most one response out.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let parsed: Value = match serde_json::from_str(line.trim()) {
            Ok(value) => value,
            Err(err) => {
                self.logger.warn(
                    "unparseable message",
                    Some(&serde_json::json!({ "error": err.to_string() })),
                );
                return Some(JsonRpcResponse::parse_error());
            }
        };
        let id = parsed.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(req) => req,
            Err(_) => return Some(JsonRpcResponse::invalid_request(id)),
        };
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::invalid_request(id));
        }
        if request.is_notification() {
            self.logger.debug("notification", Some(&Value::String(request.method)));
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.handle_tools_list()),
            "tools/call" => match self.handle_tools_call(&request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => JsonRpcResponse::from_error(id, err),
            },
            method => JsonRpcResponse::from_error(id, McpError::method_not_found(method)),
        };
        Some(response)
    }

    /// Reads newline-delimited JSON-RPC from `reader` until EOF. Requests run
    /// concurrently; each response is written as one line once it is ready.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<(), ToolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(async move {
            let mut writer = BufWriter::new(writer);
            while let Some(payload) = rx.recv().await {
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut lines = BufReader::new(reader).lines();
        let mut in_flight = JoinSet::new();
        while let Some(line) = lines.next_line().await? {
            reap_finished(&mut in_flight);
            if line.trim().is_empty() {
                continue;
            }
            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    match serde_json::to_string(&response) {
                        Ok(payload) => {
                            let _ = tx.send(payload);
                        }
                        Err(err) => server.logger.error(
                            "failed to encode response",
                            Some(&serde_json::json!({ "error": err.to_string() })),
                        ),
                    }
                }
            });
        }
        while in_flight.join_next().await.is_some() {}
        drop(tx);

        writer_task
            .await
            .map_err(|err| ToolError::internal(format!("Writer task failed: {}", err)))??;
        Ok(())
    }

    pub async fn run_stdio(self: Arc<Self>) -> Result<(), ToolError> {
        self.logger.info(
            "SourceSync MCP server running on stdio",
            Some(&self.app.settings.describe()),
        );
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }
}

pub async fn run_stdio() -> Result<(), ToolError> {
    let server = Arc::new(McpServer::from_env()?);
    server.run_stdio().await
}

/// Drops completed request tasks so a long session does not accumulate them.
fn reap_finished(in_flight: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while in_flight.try_join_next().is_some() {
        reaped += 1;
    }
    reaped
}

#[cfg(test)]
mod tests {
    use super::reap_finished;
    use tokio::sync::oneshot;
    use tokio::task::JoinSet;

    #[tokio::test]
    async fn finished_tasks_are_reaped_while_pending_ones_stay() {
        let mut in_flight = JoinSet::new();
        let (release, wait) = oneshot::channel::<()>();
        in_flight.spawn(async move {
            let _ = wait.await;
        });
        for _ in 0..3 {
            in_flight.spawn(async {});
        }
        while in_flight.len() > 1 {
            tokio::task::yield_now().await;
            reap_finished(&mut in_flight);
        }
        assert_eq!(in_flight.len(), 1);

        release.send(()).unwrap();
        while in_flight.join_next().await.is_some() {}
        assert_eq!(reap_finished(&mut in_flight), 0);
        assert!(in_flight.is_empty());
    }
}
