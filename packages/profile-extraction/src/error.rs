//! Typed errors for the extraction core.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use std::time::Duration;

use llm_client::LlmError;
use thiserror::Error;

/// Errors from a single backend attempt.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Attempt exceeded its timeout budget
    #[error("backend timed out after {0:?}")]
    Timeout(Duration),

    /// Backend returned a non-2xx status
    #[error("backend HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Network-level failure before any HTTP status arrived
    #[error("backend unreachable: {0}")]
    Network(String),

    /// Response arrived but its envelope carried nothing usable
    #[error("unusable backend envelope: {0}")]
    Envelope(String),

    /// Backend misconfigured (missing credentials, bad model name)
    #[error("backend config error: {0}")]
    Config(String),
}

impl BackendError {
    /// Whether a retry (or a race against the secondary backend) has a
    /// reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Envelope(_) | Self::Config(_) => false,
        }
    }

    /// The HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<LlmError> for BackendError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout { elapsed_ms } => Self::Timeout(Duration::from_millis(elapsed_ms)),
            LlmError::Api { status, message } => Self::Http { status, message },
            LlmError::Network(msg) => Self::Network(msg),
            LlmError::Parse(msg) => Self::Envelope(msg),
            LlmError::Config(msg) => Self::Config(msg),
        }
    }
}

/// Errors reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable missing
    #[error("missing environment variable: {0}")]
    MissingVar(String),

    /// Value present but unusable
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Errors from the credit-ledger collaborator.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Account balance too low to place the hold
    #[error("insufficient balance for account {account_id}")]
    InsufficientBalance { account_id: String },

    /// Hold token unknown or already settled
    #[error("unknown hold: {0}")]
    UnknownHold(String),

    /// Ledger backend failure
    #[error("ledger error: {0}")]
    Backend(String),
}

/// Result type for backend attempts.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
