//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding frames.
///
/// Decode errors are scoped to a single frame: callers log them and move on to
/// the next frame rather than tearing down the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame text is not valid JSON or does not match the expected shape.
    #[error("JSON decode failed: {0}")]
    JsonDecode(String),

    /// Serializing an outbound frame failed.
    #[error("JSON encode failed: {0}")]
    JsonEncode(String),
}

impl ProtocolError {
    pub(crate) fn decode(err: &serde_json::Error) -> Self {
        Self::JsonDecode(err.to_string())
    }

    pub(crate) fn encode(err: &serde_json::Error) -> Self {
        Self::JsonEncode(err.to_string())
    }
}
