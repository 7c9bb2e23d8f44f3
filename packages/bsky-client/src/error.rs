//! Error types for the Bluesky client.

use thiserror::Error;

/// Result type for Bluesky client operations.
pub type Result<T> = std::result::Result<T, BskyError>;

/// Bluesky client errors.
#[derive(Debug, Error)]
pub enum BskyError {
    /// HTTP transport or body decode failure, from `reqwest`
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx XRPC response
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Login was rejected or no session is established
    #[error("authentication error: {0}")]
    Auth(String),
}
