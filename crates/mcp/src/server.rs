//! MCP server loop: line-delimited JSON-RPC over a reader/writer pair.

use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, RequestId, ServerCapabilities, ServerInfo, ToolsCapability,
    negotiate_protocol_version,
};
use crate::registry::ToolRegistry;

/// Maximum inbound message size (4MB).
pub const MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// An MCP server exposing the tools in a registry.
///
/// Messages are handled strictly one at a time, in arrival order.
pub struct Server {
    info: ServerInfo,
    instructions: Option<String>,
    registry: ToolRegistry,
}

impl Server {
    pub fn new(name: impl Into<String>, version: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            instructions: None,
            registry,
        }
    }

    /// Usage hints sent to the client in the initialize result.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve over the process's stdin and stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve until the reader reaches EOF.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let bytes_read = reader.read_until(b'\n', &mut buf).await?;
            if bytes_read == 0 {
                tracing::info!("client closed the connection");
                break;
            }

            if let Some(response) = self.handle_message(&buf).await {
                write_message(&mut writer, &response).await?;
            }
        }
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications and blank
    /// lines.
    pub async fn handle_message(&self, raw: &[u8]) -> Option<JsonRpcResponse> {
        if raw.len() > MAX_MESSAGE_SIZE {
            return Some(JsonRpcResponse::failure(
                None,
                JsonRpcError::invalid_request(format!(
                    "message too large: {} bytes (max {MAX_MESSAGE_SIZE})",
                    raw.len()
                )),
            ));
        }

        let text = match std::str::from_utf8(raw) {
            Ok(text) => text.trim(),
            Err(e) => return Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error(e))),
        };
        if text.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => return Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error(e))),
        };

        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => return Some(JsonRpcResponse::failure(id, JsonRpcError::invalid_request(e))),
        };
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::failure(
                request.id,
                JsonRpcError::invalid_request(format!("unsupported jsonrpc version {}", request.jsonrpc)),
            ));
        }

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        let result = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => to_result(&ListToolsResult {
                tools: self.registry.tools(),
            }),
            "tools/call" => self.call_tool(request.params).await,
            other => {
                tracing::debug!(method = other, "unknown method");
                Err(JsonRpcError::method_not_found(other))
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::failure(Some(id), error),
        })
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => tracing::info!("client initialized"),
            "notifications/cancelled" => {
                tracing::debug!("cancellation ignored; requests run to completion")
            }
            other => tracing::debug!(method = other, "ignoring notification"),
        }
    }

    fn initialize(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(p) => serde_json::from_value(p).map_err(JsonRpcError::invalid_params)?,
            None => InitializeParams::default(),
        };

        let protocol_version = negotiate_protocol_version(params.protocol_version.as_deref());
        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                protocol_version,
                "initialize"
            );
        }

        to_result(&InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: self.info.clone(),
            instructions: self.instructions.clone(),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("missing tools/call params"))
            .and_then(|p| serde_json::from_value(p).map_err(JsonRpcError::invalid_params))?;

        tracing::info!(tool = %params.name, "tool call");

        let result = match self.registry.call(&params.name, params.arguments).await {
            Ok(result) => result,
            Err(e @ (Error::ToolNotFound(_) | Error::InvalidParams { .. })) => {
                tracing::warn!(tool = %params.name, error = %e, "rejected tool call");
                return Err(JsonRpcError::invalid_params(e));
            }
            Err(e) => return Err(JsonRpcError::internal_error(e)),
        };

        to_result(&result)
    }
}

fn to_result<T: Serialize>(value: &T) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(JsonRpcError::internal_error)
}

async fn write_message<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CallToolResult;
    use serde::Deserialize;
    use schemars::JsonSchema;

    #[derive(Deserialize, JsonSchema)]
    struct AddParams {
        a: i64,
        b: i64,
    }

    fn server() -> Server {
        let mut registry = ToolRegistry::new();
        registry
            .register("add", "Add two numbers", |p: AddParams| async move {
                CallToolResult::text((p.a + p.b).to_string())
            })
            .unwrap();
        Server::new("test-server", "0.0.1", registry).with_instructions("be nice")
    }

    /// Run the server over an in-memory input and collect the responses.
    async fn run(input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        server().serve(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn initialize_handshake() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
        );
        let responses = run(input).await;
        assert_eq!(responses.len(), 1);
        let result = &responses[0]["result"];
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "test-server");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(result["instructions"], "be nice");
    }

    #[tokio::test]
    async fn lists_tools() {
        let responses = run("{\"jsonrpc\":\"2.0\",\"id\":\"a\",\"method\":\"tools/list\"}\n").await;
        assert_eq!(responses[0]["id"], "a");
        let tools = responses[0]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "add");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn calls_tool() {
        let responses = run(
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/call\",\"params\":{\"name\":\"add\",\"arguments\":{\"a\":2,\"b\":3}}}\n",
        )
        .await;
        let result = &responses[0]["result"];
        assert_eq!(result["content"][0]["text"], "5");
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn invalid_arguments_are_invalid_params() {
        let responses = run(
            "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"tools/call\",\"params\":{\"name\":\"add\",\"arguments\":{\"a\":\"x\"}}}\n",
        )
        .await;
        assert_eq!(responses[0]["error"]["code"], JsonRpcError::INVALID_PARAMS);
        assert_eq!(responses[0]["id"], 3);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let responses = run(
            "{\"jsonrpc\":\"2.0\",\"id\":4,\"method\":\"tools/call\",\"params\":{\"name\":\"nope\"}}\n",
        )
        .await;
        assert_eq!(responses[0]["error"]["code"], JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let responses = run("{\"jsonrpc\":\"2.0\",\"id\":5,\"method\":\"resources/list\"}\n").await;
        assert_eq!(responses[0]["error"]["code"], JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_json_gets_parse_error_and_loop_continues() {
        let input = concat!(
            "{not json\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":6,"method":"ping"}"#,
            "\n",
        );
        let responses = run(input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], JsonRpcError::PARSE_ERROR);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["id"], 6);
        assert_eq!(responses[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn null_id_request_gets_a_reply() {
        let responses = run("{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"ping\"}\n").await;
        assert_eq!(responses.len(), 1);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[0]["result"], json!({}));
    }

    #[tokio::test]
    async fn wrong_jsonrpc_version_is_invalid_request() {
        let responses = run("{\"jsonrpc\":\"1.0\",\"id\":7,\"method\":\"ping\"}\n").await;
        assert_eq!(responses[0]["error"]["code"], JsonRpcError::INVALID_REQUEST);
        assert_eq!(responses[0]["id"], 7);
    }

    #[tokio::test]
    async fn oversized_message_is_rejected() {
        let raw = vec![b' '; MAX_MESSAGE_SIZE + 1];
        let response = server().handle_message(&raw).await.unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn unknown_notifications_get_no_reply() {
        let responses = run("{\"jsonrpc\":\"2.0\",\"method\":\"notifications/whatever\"}\n").await;
        assert!(responses.is_empty());
    }
}
