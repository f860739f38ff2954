//! Validation run configuration.

use crate::progress::RunProgress;
use crate::sample::SpotCheckConfig;
use chrono::{DateTime, Utc};
use crosswalk_core::RetryPolicy;
use std::time::Duration;

/// Lower bound for the individual-lookup concurrency limit.
pub const MIN_CONCURRENCY: usize = 5;

/// Upper bound for the individual-lookup concurrency limit.
pub const MAX_CONCURRENCY: usize = 100;

/// Default individual-lookup concurrency.
pub const DEFAULT_CONCURRENCY: usize = 30;

/// Default directory page size.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Checkpointed state handed back by a client to continue an interrupted
/// run. The engine seeds its counters from `progress` and pages from
/// `cursor`; a fresh artifact is always created.
#[derive(Debug, Clone)]
pub struct ResumePoint {
    /// Cursor from the run's last emitted checkpoint.
    pub cursor: String,
    /// Counter snapshot from the same checkpoint.
    pub progress: RunProgress,
    /// Activity watermark from the same checkpoint.
    pub last_processed_date: Option<DateTime<Utc>>,
}

/// One validation run's parameters.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Bounded parallelism for individual fallback lookups (clamped to
    /// 5–100 at run time).
    pub concurrency: usize,

    /// Directory page size.
    pub page_size: u32,

    /// Optional hard cap on processed records.
    pub max_records: Option<u64>,

    /// Lower bound for the directory query filter. The fresh-run fallback
    /// when a checkpoint cursor has expired: filter on the last processed
    /// date instead of resuming.
    pub start_date: Option<DateTime<Utc>>,

    /// Continue from a previously emitted checkpoint.
    pub resume: Option<ResumePoint>,

    /// Randomized spot-check mode instead of a full scan.
    pub spot_check: Option<SpotCheckConfig>,

    /// Retry policy for directory page fetches.
    pub search_retry: RetryPolicy,

    /// Retry policy for individual profile fallback lookups.
    pub fallback_retry: RetryPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
            max_records: None,
            start_date: None,
            resume: None,
            spot_check: None,
            search_retry: RetryPolicy::new(3, Duration::from_secs(2)),
            fallback_retry: RetryPolicy::new(2, Duration::from_secs(1)),
        }
    }
}

impl RunConfig {
    /// Concurrency clamped into the supported range.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY)
    }

    /// Directory query filter for this run.
    #[must_use]
    pub fn query_filter(&self) -> String {
        match self.start_date {
            Some(date) => format!("updatedAt ge \"{}\"", date.to_rfc3339()),
            None => "true".to_string(),
        }
    }
}
