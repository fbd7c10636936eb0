//! Error types for issuestat

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for issuestat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for issuestat operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No access token could be found
    #[error(
        "Could not get GitHub access token. Set GITHUB_ACCESS_TOKEN (or GITHUB_TOKEN) \
         or add a token to the secrets file"
    )]
    MissingCredential,

    /// The user refused to overwrite an existing output file
    #[error("Operation cancelled by user: {} was left untouched", .0.display())]
    OverwriteDeclined(PathBuf),

    /// A successful response did not have the expected shape
    #[error("Unexpected response shape: {message}")]
    DataShape {
        /// What was missing or malformed
        message: String,
        /// Pretty-printed raw response, kept for diagnosis
        response: String,
    },
}

impl Error {
    /// Build a data-shape error carrying a dump of the offending response
    pub fn data_shape(message: impl Into<String>, response: &serde_json::Value) -> Self {
        Error::DataShape {
            message: message.into(),
            response: serde_json::to_string_pretty(response)
                .unwrap_or_else(|_| response.to_string()),
        }
    }
}
