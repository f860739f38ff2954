//! Validation event union streamed to clients.
//!
//! One run pushes all of its output through a single channel of tagged
//! events; consumers pattern-match on the tag. The serialized form is
//! `{"type": ..., "data": ...}`.

use crate::checkpoint::Checkpoint;
use crate::compare::MismatchKind;
use crate::progress::RunProgress;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One classified discrepancy, as streamed and as written to the CSV
/// artifact. Append-only: mismatches are never revised within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMismatch {
    /// Monotonic id, unique within the run (`m-<n>`).
    pub id: String,

    /// Directory identifier of the affected record.
    pub directory_record_id: String,

    /// Directory-side contact address, for triage.
    pub email: String,

    /// Profile-store identifier involved (empty for missing-id findings).
    pub external_id: String,

    /// Which rule fired.
    pub mismatch_type: MismatchKind,

    /// Directory-side value involved in the comparison.
    pub source_value: String,

    /// Profile-side value involved in the comparison.
    pub target_value: String,

    /// When the mismatch was classified.
    pub timestamp: DateTime<Utc>,

    /// Human-readable explanation.
    pub details: String,
}

/// Progress payload; the optional message rides along on the first emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(flatten)]
    pub progress: RunProgress,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Final summary carried by the `complete` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Key for downloading the CSV artifact.
    pub job_id: String,

    /// Final counter values.
    pub summary: RunProgress,

    /// Ids picked this run; present only in spot-check mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampled_user_ids: Option<Vec<String>>,
}

/// Error notice: terminal failure or cooperative abort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Tagged event union pushed over the run's event channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ValidationEvent {
    /// Counter update, once per processed page.
    Progress(ProgressUpdate),
    /// One classified discrepancy.
    Mismatch(ValidationMismatch),
    /// Resumption state, once per page while more pages remain.
    Checkpoint(Checkpoint),
    /// The run finished; the artifact is downloadable under `job_id`.
    Complete(RunSummary),
    /// Terminal failure or abort notice.
    Error(ErrorNotice),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag_and_data() {
        let event = ValidationEvent::Error(ErrorNotice {
            message: "Validation aborted by user".to_string(),
            details: None,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["data"]["message"], "Validation aborted by user");
        assert!(json["data"].get("details").is_none());
    }

    #[test]
    fn test_mismatch_event_wire_shape() {
        let event = ValidationEvent::Mismatch(ValidationMismatch {
            id: "m-7".to_string(),
            directory_record_id: "01234567-89ab-cdef-0123-456789abcdef".to_string(),
            email: "ada@example.com".to_string(),
            external_id: "0123456789abcdef0123456789abcdef".to_string(),
            mismatch_type: MismatchKind::EmailMismatch,
            source_value: "userName: ada@example.com, email: ".to_string(),
            target_value: "other@example.com".to_string(),
            timestamp: Utc::now(),
            details: "Directory email fields do not match".to_string(),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "mismatch");
        assert_eq!(json["data"]["mismatchType"], "email_mismatch");
        assert_eq!(json["data"]["directoryRecordId"], "01234567-89ab-cdef-0123-456789abcdef");
        assert_eq!(json["data"]["id"], "m-7");
    }

    #[test]
    fn test_progress_event_flattens_counters() {
        let event = ValidationEvent::Progress(ProgressUpdate {
            progress: RunProgress::new(),
            message: Some("Starting validation...".to_string()),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["data"]["totalProcessed"], 0);
        assert_eq!(json["data"]["message"], "Starting validation...");
    }

    #[test]
    fn test_complete_event_omits_sample_ids_in_full_mode() {
        let event = ValidationEvent::Complete(RunSummary {
            job_id: "recon-1-abc123".to_string(),
            summary: RunProgress::new(),
            sampled_user_ids: None,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "complete");
        assert!(json["data"].get("sampledUserIds").is_none());
        assert_eq!(json["data"]["jobId"], "recon-1-abc123");
    }
}
