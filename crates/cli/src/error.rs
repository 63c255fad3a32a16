//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
///
/// Any of these before the server starts means no tool call is ever read.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or missing required fields.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The Gong client could not be built.
    #[error(transparent)]
    Gong(#[from] gong::Error),

    /// The MCP layer failed (tool registration or transport I/O).
    #[error(transparent)]
    Mcp(#[from] mcp::Error),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
