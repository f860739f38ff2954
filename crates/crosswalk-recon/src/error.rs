//! Engine error taxonomy.
//!
//! Only failures that terminate a run live here. Lookup failures never do:
//! a failed batch chunk falls through to the individual fallback, and an
//! exhausted individual fallback leaves that one record's profile absent
//! (classified as a `lookup_failed` mismatch) without aborting the run.

use thiserror::Error;

/// Terminal failures the validation engine can hit while a run is active.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Token issuance or refresh failed, after retries.
    #[error("Directory authentication failed: {0}")]
    Auth(#[source] crosswalk_directory::DirectoryError),

    /// A directory page fetch failed after exhausting retries.
    #[error("Directory search failed: {0}")]
    Search(#[source] crosswalk_directory::DirectoryError),

    /// The run was cancelled cooperatively.
    #[error("Validation aborted by user")]
    Aborted,
}
