//! Error types for the profile store client.

use thiserror::Error;

/// Errors produced by profile store lookups.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Transport-level failure talking to the profile store.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The profile store reported an API-level error for a search call.
    #[error("Profile store error {code}: {message}")]
    Api { code: i64, message: String },

    /// The response body could not be parsed.
    #[error("Failed to parse profile store response: {0}")]
    Parse(String),

    /// Client construction or configuration problem.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used across this crate.
pub type ProfileResult<T> = Result<T, ProfileError>;
