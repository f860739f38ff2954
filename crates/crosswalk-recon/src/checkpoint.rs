//! Checkpointing for resumable validation runs.
//!
//! A checkpoint is emitted after every processed page and supersedes the
//! previous one. Clients hold on to the latest checkpoint and hand it back
//! to resume an interrupted run from its cursor.

use crate::progress::RunProgress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resumption state for one run.
///
/// The cursor always originates from the immediately preceding directory
/// page fetch. When a cursor has expired by the time a resume is attempted,
/// `last_processed_date` serves as a heuristic lower bound for a fresh,
/// date-filtered run instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Opaque pagination cursor pointing at the next unprocessed page.
    pub cursor: String,

    /// Counter snapshot at the time the checkpoint was taken.
    pub progress: RunProgress,

    /// Most recent profile activity timestamp seen during the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_processed_date: Option<DateTime<Utc>>,

    /// When the checkpoint was taken.
    pub timestamp: DateTime<Utc>,
}

impl Checkpoint {
    /// Create a checkpoint for the current page boundary.
    #[must_use]
    pub fn new(
        cursor: String,
        progress: RunProgress,
        last_processed_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            cursor,
            progress,
            last_processed_date,
            timestamp: Utc::now(),
        }
    }
}
