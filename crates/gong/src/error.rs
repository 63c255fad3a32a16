use thiserror::Error;

/// Errors raised by the Gong client.
///
/// `Configuration` is only produced while building credentials or the client,
/// so it surfaces at startup. The other variants come from individual calls.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("Gong API error: {0}")]
    Upstream(String),

    #[error("invalid input: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
