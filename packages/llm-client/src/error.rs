//! Error types for the LLM client.

use thiserror::Error;

/// Result type for LLM client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection refused, DNS failure)
    #[error("network error: {0}")]
    Network(String),

    /// Request deadline exceeded
    #[error("request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// API returned a non-2xx status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
}

impl LlmError {
    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// Timeouts, network failures, rate limits (429) and server errors (5xx)
    /// are transient. Every other API status (auth failures, bad requests) is
    /// terminal: retrying a rejected request buys a second guaranteed failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Config(_) | Self::Parse(_) => false,
        }
    }

    /// The HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
