//! Typed errors for the amplifier library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so call sites can
//! decide between log-and-skip and log-and-abort explicitly.

use thiserror::Error;

/// Classification of collaborator call failures.
///
/// Only [`ErrorKind::Fatal`] aborts a run; everything else is handled
/// locally at the call site (a failed source yields zero candidates, a
/// failed action skips one candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network-level or likely-temporary failure; safe to retry next run
    Transient,
    /// The remote service refused the request (rate limit, bad input)
    RejectedByPolicy,
    /// Unrecoverable for this run (e.g. authentication failure)
    Fatal,
}

/// A failure of one collaborator API call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::RejectedByPolicy,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Fatal,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Fatal
    }
}

/// Errors from the persisted state store.
#[derive(Debug, Error)]
pub enum StateError {
    /// Filesystem failure while reading or writing the state file
    #[error("state io error: {0}")]
    Io(#[from] std::io::Error),

    /// State could not be serialized
    #[error("state encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Top-level error for a run.
#[derive(Debug, Error)]
pub enum AmplifyError {
    /// A fatal collaborator failure surfaced to the caller
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Persisting the state store failed
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Invalid configuration detected at startup
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for collaborator API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Result type alias for amplifier operations.
pub type Result<T> = std::result::Result<T, AmplifyError>;
