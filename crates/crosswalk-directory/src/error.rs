//! Error types for the directory client.

use thiserror::Error;

/// Errors produced by directory authentication and search.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Token issuance or refresh failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The search endpoint returned a non-success status.
    #[error("Directory search failed ({status}): {body}")]
    Search { status: u16, body: String },

    /// Transport-level failure talking to the directory.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be parsed.
    #[error("Failed to parse directory response: {0}")]
    Parse(String),

    /// Client construction or configuration problem.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used across this crate.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
