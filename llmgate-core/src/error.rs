//! Error types for the llmgate core library.

use thiserror::Error;

/// Failure while decoding a tool call or its arguments.
///
/// The variants keep the outer envelope apart from the string-embedded
/// arguments blob, so a malformed transport payload can be told apart from
/// malformed model output.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The outer `{"name": ..., "arguments": "..."}` object is malformed.
    #[error("malformed tool-call envelope: {0}")]
    Envelope(String),

    /// The arguments string is not valid JSON.
    #[error("malformed tool-call arguments: {0}")]
    Arguments(String),

    /// The arguments JSON parsed, but its top-level value is not an object.
    #[error("malformed tool-call arguments: expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON kind found at the top level.
        found: &'static str,
    },
}

impl DecodeError {
    /// Whether the failure originated in the arguments blob rather than the envelope.
    #[must_use]
    pub fn is_arguments(&self) -> bool {
        matches!(self, Self::Arguments(_) | Self::NotAnObject { .. })
    }
}

/// Top-level error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input was rejected before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A JSON schema definition was rejected.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Tool-call decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// JSON serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Human-readable name of a JSON value's kind.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
