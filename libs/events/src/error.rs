//! Error types for the shared vocabulary.

use thiserror::Error;

/// Errors raised while decoding statuses or push frames.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// A status string that names no known variant.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// A push frame that could not be decoded.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::InvalidFrame(err.to_string())
    }
}
