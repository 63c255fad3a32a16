//! MCP (Model Context Protocol) server library.
//!
//! This crate serves tools to an MCP client over line-delimited JSON-RPC,
//! normally on stdin/stdout.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{CallToolResult, Server, ToolRegistry};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct GreetParams {
//!     /// Who to greet.
//!     name: String,
//! }
//!
//! # async fn example() -> mcp::Result<()> {
//! let mut registry = ToolRegistry::new();
//! registry.register("greet", "Say hello", |p: GreetParams| async move {
//!     CallToolResult::text(format!("Hello, {}!", p.name))
//! })?;
//!
//! let server = Server::new("greeter", env!("CARGO_PKG_VERSION"), registry);
//! server.serve_stdio().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod protocol;
mod registry;
mod server;

pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, ClientInfo, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, RequestId, SUPPORTED_PROTOCOL_VERSIONS,
    ServerCapabilities, ServerInfo, Tool, ToolContent, ToolsCapability,
    negotiate_protocol_version,
};
pub use registry::ToolRegistry;
pub use server::{MAX_MESSAGE_SIZE, Server};
