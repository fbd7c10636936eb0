//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport error or timeout
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("GitHub returned HTTP {status}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),
}
