//! Client error types.

use llmgate_core::{CoreError, DecodeError};
use thiserror::Error;

/// Errors that can occur during gateway operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Request rejected locally before any I/O.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A tool call could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Gateway response was not the expected JSON.
    #[error("Failed to parse gateway response: {0}")]
    Parse(String),

    /// Gateway rejected the request with a 4xx status.
    #[error("Gateway rejected request (HTTP {status}): {message}")]
    Remote {
        /// HTTP status.
        status: u16,
        /// Error message reported by the gateway.
        message: String,
    },

    /// Gateway failed with a non-4xx error status.
    #[error("Gateway returned HTTP {status}: {body}")]
    Http {
        /// HTTP status.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Connection-level failure.
    #[error("Gateway request failed: {0}")]
    Transport(String),

    /// Request timed out.
    #[error("Gateway request timed out after {0}ms")]
    Timeout(u64),

    /// All retry attempts exhausted.
    #[error("All retry attempts exhausted after {attempts} tries: {last_error}")]
    RetriesExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        last_error: String,
    },

    /// Response was well-formed but not usable.
    #[error("Unexpected gateway response: {0}")]
    Unexpected(String),

    /// Configuration error.
    #[error("Client configuration error: {0}")]
    Config(String),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LlmError {
    /// Whether another attempt could succeed.
    ///
    /// Only connection failures, timeouts and 5xx responses qualify.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(0)
        } else if err.is_decode() {
            LlmError::Parse(err.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

impl From<CoreError> for LlmError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) | CoreError::Schema(msg) => LlmError::Validation(msg),
            CoreError::Config(msg) => LlmError::Config(msg),
            CoreError::Decode(e) => LlmError::Decode(e),
            CoreError::Serialization(e) => LlmError::Parse(e.to_string()),
            CoreError::Io(e) => LlmError::Io(e),
        }
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, LlmError>;
