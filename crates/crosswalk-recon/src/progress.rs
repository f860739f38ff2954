//! Run progress counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which bucket one processed record landed in.
///
/// Every processed record lands in exactly one bucket: a record that
/// produced several mismatch events still counts once, and a record whose
/// lookup failed counts only as an error even when it also produced a
/// `missing_external_id` finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Zero findings.
    Match,
    /// At least one mismatch finding.
    Mismatched,
    /// The profile lookup never returned.
    LookupError,
}

/// Mutable counters scoped to one validation run.
///
/// `mismatches` counts mismatch *events*; a single record can contribute
/// several. The record-level partition is:
/// `total_processed == matches + (records with ≥1 mismatch) + errors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgress {
    /// Records processed so far.
    pub total_processed: u64,

    /// Records with zero findings.
    pub matches: u64,

    /// Mismatch events emitted.
    pub mismatches: u64,

    /// Records whose profile lookup failed outright.
    pub errors: u64,

    /// Whether the run is still active.
    pub is_running: bool,

    /// When the run (or the original run, if resumed) started.
    pub start_time: DateTime<Utc>,

    /// When the counters were last updated.
    pub last_update_time: DateTime<Utc>,

    /// Records per second since the run started.
    pub rate: u64,
}

impl RunProgress {
    /// Fresh counters for a new run.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            total_processed: 0,
            matches: 0,
            mismatches: 0,
            errors: 0,
            is_running: true,
            start_time: now,
            last_update_time: now,
            rate: 0,
        }
    }

    /// Seed counters from a checkpointed snapshot, keeping its start time
    /// so the rate stays meaningful across the resumed run.
    #[must_use]
    pub fn resumed(snapshot: &RunProgress) -> Self {
        Self {
            is_running: true,
            last_update_time: Utc::now(),
            rate: 0,
            ..snapshot.clone()
        }
    }

    /// Count one processed record into exactly one bucket.
    pub fn record(&mut self, outcome: RecordOutcome) {
        self.total_processed += 1;
        match outcome {
            RecordOutcome::Match => self.matches += 1,
            RecordOutcome::Mismatched => {}
            RecordOutcome::LookupError => self.errors += 1,
        }
    }

    /// Count one emitted mismatch event.
    pub fn count_mismatch_event(&mut self) {
        self.mismatches += 1;
    }

    /// Recompute the derived rate and bump the update timestamp.
    pub fn touch(&mut self) {
        let now = Utc::now();
        let elapsed_secs = (now - self.start_time).num_milliseconds().max(1) as f64 / 1000.0;
        self.rate = (self.total_processed as f64 / elapsed_secs).round() as u64;
        self.last_update_time = now;
    }
}

impl Default for RunProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_partitions_without_overlap() {
        let mut progress = RunProgress::new();
        let outcomes = [
            RecordOutcome::Match,
            RecordOutcome::Match,
            RecordOutcome::Mismatched,
            RecordOutcome::LookupError,
            RecordOutcome::Mismatched,
        ];
        let mut mismatched_records = 0u64;
        for outcome in outcomes {
            progress.record(outcome);
            if outcome == RecordOutcome::Mismatched {
                mismatched_records += 1;
            }
        }

        assert_eq!(progress.total_processed, 5);
        assert_eq!(progress.matches, 2);
        assert_eq!(progress.errors, 1);
        assert_eq!(
            progress.total_processed,
            progress.matches + mismatched_records + progress.errors
        );
    }

    #[test]
    fn test_mismatch_events_can_exceed_mismatched_records() {
        let mut progress = RunProgress::new();
        // One record with three findings.
        progress.count_mismatch_event();
        progress.count_mismatch_event();
        progress.count_mismatch_event();
        progress.record(RecordOutcome::Mismatched);

        assert_eq!(progress.total_processed, 1);
        assert_eq!(progress.mismatches, 3);
        assert_eq!(progress.matches, 0);
    }

    #[test]
    fn test_resumed_keeps_counters_and_start_time() {
        let mut original = RunProgress::new();
        original.record(RecordOutcome::Match);
        original.record(RecordOutcome::LookupError);
        original.is_running = false;

        let resumed = RunProgress::resumed(&original);
        assert_eq!(resumed.total_processed, 2);
        assert_eq!(resumed.matches, 1);
        assert_eq!(resumed.errors, 1);
        assert_eq!(resumed.start_time, original.start_time);
        assert!(resumed.is_running);
    }

    #[test]
    fn test_serde_camel_case() {
        let progress = RunProgress::new();
        let json = serde_json::to_value(&progress).unwrap();
        assert!(json.get("totalProcessed").is_some());
        assert!(json.get("isRunning").is_some());
        assert!(json.get("lastUpdateTime").is_some());
    }
}
