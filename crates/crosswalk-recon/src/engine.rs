//! Validation orchestrator.
//!
//! Drives the full pipeline: authenticate, page through the directory with
//! one page of lookahead, batch-resolve profiles, fall back to bounded
//! individual lookups, classify, and emit events.
//!
//! Two tasks cooperate per run: a fetcher that owns directory pagination
//! (and token refresh before each page) and the comparer loop below,
//! connected by a bounded channel whose depth caps the lookahead. Progress
//! and checkpoint events for page N are always emitted before page N+1 is
//! processed, though its network fetch may already be in flight.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

use crosswalk_core::RetryPolicy;
use crosswalk_directory::{DirectoryClient, DirectoryRecord};
use crosswalk_profile::{ProfileClient, ProfileRecord};

use crate::artifact::{new_job_id, JobArtifact, JobArtifactStore};
use crate::checkpoint::Checkpoint;
use crate::compare::{compare, primary_email, raw_external_id, Finding, MismatchKind};
use crate::config::RunConfig;
use crate::error::EngineError;
use crate::events::{ErrorNotice, ProgressUpdate, RunSummary, ValidationEvent, ValidationMismatch};
use crate::progress::{RecordOutcome, RunProgress};
use crate::report;
use crate::sample::SpotCheckSampler;

/// Lookahead depth for the page pipeline: the fetcher runs at most this
/// many pages ahead of the comparer.
const PAGE_LOOKAHEAD: usize = 1;

/// One fetched directory page plus the cursor pointing past it.
#[derive(Debug)]
struct FetchedPage {
    records: Vec<DirectoryRecord>,
    next_cursor: Option<String>,
}

/// The validation orchestrator.
///
/// One engine instance drives exactly one run; events are pushed into the
/// supplied channel and the CSV artifact lands in the injected store.
pub struct ValidationEngine {
    directory: DirectoryClient,
    profiles: ProfileClient,
    artifacts: Arc<dyn JobArtifactStore>,
    config: RunConfig,
}

impl ValidationEngine {
    /// Create an engine for one run.
    #[must_use]
    pub fn new(
        directory: DirectoryClient,
        profiles: ProfileClient,
        artifacts: Arc<dyn JobArtifactStore>,
        config: RunConfig,
    ) -> Self {
        Self {
            directory,
            profiles,
            artifacts,
            config,
        }
    }

    /// Run the validation to completion, pushing events into `events`.
    ///
    /// The `cancel` flag is polled at the top of every page iteration;
    /// setting it stops the run after in-flight lookups for the current
    /// page finish. A closed event channel (client disconnect) has the same
    /// effect. Whatever accumulated before an abort or terminal failure is
    /// still finalized into a downloadable artifact.
    pub async fn run(self, events: mpsc::Sender<ValidationEvent>, cancel: Arc<AtomicBool>) {
        let job_id = new_job_id();
        self.artifacts.sweep_expired();

        info!(job_id = %job_id, "Starting validation run");

        // Authenticating: surface token failures before any paging starts.
        if let Err(error) = self.directory.authenticate().await {
            warn!(error = %error, "Authentication failed, run not started");
            let _ = events
                .send(ValidationEvent::Error(ErrorNotice {
                    message: "Directory authentication failed".to_string(),
                    details: Some(error.to_string()),
                }))
                .await;
            return;
        }

        let resuming = self.config.resume.is_some();
        let (mut progress, initial_cursor, mut last_processed_date) = match &self.config.resume {
            Some(resume) => (
                RunProgress::resumed(&resume.progress),
                Some(resume.cursor.clone()),
                resume.last_processed_date,
            ),
            None => (RunProgress::new(), None, None),
        };
        // Resumed runs continue the id sequence where the prior run left off.
        let mut mismatch_sequence = progress.mismatches + progress.errors;

        let message = if resuming {
            format!(
                "Resuming validation from checkpoint ({} already processed)...",
                progress.total_processed
            )
        } else {
            "Authenticated to the directory. Starting validation...".to_string()
        };
        if !emit(&events, progress_event(&progress, Some(message))).await {
            return;
        }

        let mut sampler = self.config.spot_check.as_ref().map(SpotCheckSampler::new);
        let mut csv_rows: Vec<String> = vec![report::header_row()];
        let semaphore = Arc::new(Semaphore::new(self.config.effective_concurrency()));
        let fallback_retry = self.config.fallback_retry.clone();

        let mut pages = spawn_fetcher(
            self.directory.clone(),
            self.config.query_filter(),
            self.config.page_size,
            initial_cursor,
            self.config.search_retry.clone(),
            Arc::clone(&cancel),
        );

        let mut run_error: Option<EngineError> = None;

        'pages: while let Some(fetched) = pages.recv().await {
            // Cancellation is cooperative, checked once per page.
            if cancel.load(Ordering::Relaxed) {
                run_error = Some(EngineError::Aborted);
                break 'pages;
            }

            let page = match fetched {
                Ok(page) => page,
                Err(error) => {
                    run_error = Some(error);
                    break 'pages;
                }
            };

            // Spot-check mode: reduce the page to its random sample.
            let records = match sampler.as_mut() {
                Some(sampler) => {
                    if sampler.remaining() == 0 {
                        break 'pages;
                    }
                    sampler.sample_page(page.records)
                }
                None => page.records,
            };

            // BatchResolving: one chunked IN-query per page.
            let mut seen = HashSet::new();
            let mut lookup_ids = Vec::with_capacity(records.len());
            for record in &records {
                let raw = raw_external_id(record).to_lowercase();
                if seen.insert(raw.clone()) {
                    lookup_ids.push(raw);
                }
            }
            debug!(count = lookup_ids.len(), "Batch-resolving profiles for page");
            let mut resolved = self.profiles.batch_lookup(&lookup_ids).await;

            // FallbackResolving: individual lookups for the misses, bounded
            // by the semaphore. A failed lookup leaves its id unresolved
            // rather than aborting the page.
            let missing: Vec<String> = lookup_ids
                .iter()
                .filter(|id| !resolved.contains_key(*id))
                .cloned()
                .collect();
            if !missing.is_empty() {
                debug!(
                    count = missing.len(),
                    "Ids absent from batch results, falling back to individual lookups"
                );
                resolve_individually(
                    &self.profiles,
                    missing,
                    &semaphore,
                    &fallback_retry,
                    &mut resolved,
                )
                .await;
            }

            // Comparing / Emitting: pure classification, no further I/O.
            for record in &records {
                if self
                    .config
                    .max_records
                    .is_some_and(|max| progress.total_processed >= max)
                {
                    break;
                }

                let raw = raw_external_id(record).to_lowercase();
                let profile = resolved.get(&raw);

                if let Some(profile) = profile {
                    if profile.found() {
                        update_watermark(&mut last_processed_date, profile);
                    }
                }

                let findings = compare(record, profile);
                let mut lookup_error = false;
                let mut has_mismatch = false;

                for finding in findings {
                    mismatch_sequence += 1;
                    if finding.kind == MismatchKind::LookupFailed {
                        lookup_error = true;
                    } else {
                        has_mismatch = true;
                        progress.count_mismatch_event();
                    }

                    let mismatch = build_mismatch(record, profile, finding, mismatch_sequence);
                    match report::format_row(&mismatch) {
                        Ok(row) => csv_rows.push(row),
                        Err(error) => warn!(error = %error, "Skipping malformed CSV row"),
                    }
                    if !emit(&events, ValidationEvent::Mismatch(mismatch)).await {
                        run_error = Some(EngineError::Aborted);
                        break 'pages;
                    }
                }

                let outcome = if lookup_error {
                    RecordOutcome::LookupError
                } else if has_mismatch {
                    RecordOutcome::Mismatched
                } else {
                    RecordOutcome::Match
                };
                progress.record(outcome);
            }

            let reached_cap = self
                .config
                .max_records
                .is_some_and(|max| progress.total_processed >= max);
            if reached_cap {
                info!(
                    total_processed = progress.total_processed,
                    "Record cap reached, ending pagination"
                );
            }

            // Progress once per page, not per record.
            progress.touch();
            if !emit(&events, progress_event(&progress, None)).await {
                run_error = Some(EngineError::Aborted);
                break 'pages;
            }

            // Checkpoint while more pages remain, so the client can resume.
            if let Some(cursor) = page.next_cursor {
                let checkpoint =
                    Checkpoint::new(cursor, progress.clone(), last_processed_date);
                if !emit(&events, ValidationEvent::Checkpoint(checkpoint)).await {
                    run_error = Some(EngineError::Aborted);
                    break 'pages;
                }
            }

            if reached_cap {
                break 'pages;
            }
        }
        // Dropping the receiver stops the fetcher after its in-flight fetch.
        drop(pages);

        // A cancel raised while the fetcher was idle ends the loop through
        // channel closure rather than a page iteration; it is still an abort.
        if run_error.is_none() && cancel.load(Ordering::Relaxed) {
            run_error = Some(EngineError::Aborted);
        }

        if let Some(error) = &run_error {
            warn!(error = %error, "Validation run ending early");
            let _ = emit(&events, ValidationEvent::Error(error_notice(error))).await;
        }

        // Completing: finalize the artifact and emit the summary. Partial
        // results stay downloadable after an abort or terminal failure.
        progress.is_running = false;
        progress.touch();

        self.artifacts.put(JobArtifact {
            job_id: job_id.clone(),
            content: csv_rows.join("\n"),
            created_at: Utc::now(),
        });

        let sampled_user_ids = sampler.map(|s| s.sampled_ids().to_vec());
        let _ = emit(
            &events,
            ValidationEvent::Complete(RunSummary {
                job_id: job_id.clone(),
                summary: progress,
                sampled_user_ids,
            }),
        )
        .await;
        info!(job_id = %job_id, "Validation run finished");
    }
}

/// Spawn the fetcher task: directory pagination with retry and proactive
/// token refresh, one page of lookahead via the channel's bounded depth.
fn spawn_fetcher(
    directory: DirectoryClient,
    filter: String,
    page_size: u32,
    initial_cursor: Option<String>,
    retry: RetryPolicy,
    cancel: Arc<AtomicBool>,
) -> mpsc::Receiver<Result<FetchedPage, EngineError>> {
    let (tx, rx) = mpsc::channel(PAGE_LOOKAHEAD);

    tokio::spawn(async move {
        let mut cursor = initial_cursor;

        loop {
            if cancel.load(Ordering::Relaxed) {
                break;
            }

            // Refresh the token before the fetch when it is near expiry;
            // refresh failures terminate the run.
            if let Err(error) = directory.authenticate().await {
                let _ = tx.send(Err(EngineError::Auth(error))).await;
                break;
            }

            let response = retry
                .execute("Directory search", || {
                    let directory = directory.clone();
                    let filter = filter.clone();
                    let cursor = cursor.clone();
                    async move { directory.search(&filter, page_size, cursor.as_deref()).await }
                })
                .await;

            let page = match response {
                Ok(page) => page,
                Err(error) => {
                    let _ = tx.send(Err(EngineError::Search(error))).await;
                    break;
                }
            };

            if page.results.is_empty() {
                debug!("Directory returned an empty page, ending pagination");
                break;
            }

            let next_cursor = page.next_cursor.clone();
            let fetched = FetchedPage {
                records: page.results,
                next_cursor: next_cursor.clone(),
            };
            if tx.send(Ok(fetched)).await.is_err() {
                // Comparer is gone (cap reached, sample spent, or abort).
                break;
            }

            match next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
    });

    rx
}

/// Resolve the batch misses one by one, at most `semaphore` permits in
/// flight. Exhausted retries leave the id absent from `resolved`.
async fn resolve_individually(
    profiles: &ProfileClient,
    missing: Vec<String>,
    semaphore: &Arc<Semaphore>,
    retry: &RetryPolicy,
    resolved: &mut HashMap<String, ProfileRecord>,
) {
    let mut handles = Vec::with_capacity(missing.len());
    for id in missing {
        let semaphore = Arc::clone(semaphore);
        let profiles = profiles.clone();
        let retry = retry.clone();
        handles.push(tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return None;
            };
            let result = retry
                .execute("Individual profile lookup", || {
                    let profiles = profiles.clone();
                    let id = id.clone();
                    async move { profiles.individual_lookup(&id).await }
                })
                .await;
            match result {
                Ok(profile) => Some((id, profile)),
                Err(error) => {
                    warn!(
                        external_id = %id,
                        error = %error,
                        "Individual profile lookup failed after retries"
                    );
                    None
                }
            }
        }));
    }

    for handle in handles {
        if let Ok(Some((id, profile))) = handle.await {
            resolved.insert(id, profile);
        }
    }
}

/// Advance the resume watermark to the profile's most recent activity.
fn update_watermark(watermark: &mut Option<DateTime<Utc>>, profile: &ProfileRecord) {
    if let Some(date) = profile.latest_activity() {
        if watermark.map_or(true, |seen| date > seen) {
            *watermark = Some(date);
        }
    }
}

/// Materialize a pure finding into the streamed/archived mismatch record.
fn build_mismatch(
    record: &DirectoryRecord,
    profile: Option<&ProfileRecord>,
    finding: Finding,
    sequence: u64,
) -> ValidationMismatch {
    let external_id = match finding.kind {
        MismatchKind::MissingExternalId => String::new(),
        MismatchKind::LookupFailed | MismatchKind::OrphanedRecord => raw_external_id(record),
        _ => profile
            .map(|p| p.external_id.clone())
            .unwrap_or_else(|| raw_external_id(record)),
    };

    ValidationMismatch {
        id: format!("m-{sequence}"),
        directory_record_id: record.id.clone(),
        email: primary_email(record),
        external_id,
        mismatch_type: finding.kind,
        source_value: finding.source_value,
        target_value: finding.target_value,
        timestamp: Utc::now(),
        details: finding.details,
    }
}

fn progress_event(progress: &RunProgress, message: Option<String>) -> ValidationEvent {
    ValidationEvent::Progress(ProgressUpdate {
        progress: progress.clone(),
        message,
    })
}

fn error_notice(error: &EngineError) -> ErrorNotice {
    match error {
        EngineError::Auth(source) => ErrorNotice {
            message: "Failed to refresh directory token after retries".to_string(),
            details: Some(source.to_string()),
        },
        EngineError::Search(source) => ErrorNotice {
            message: "Directory search failed after retries".to_string(),
            details: Some(source.to_string()),
        },
        EngineError::Aborted => ErrorNotice {
            message: "Validation aborted by user".to_string(),
            details: None,
        },
    }
}

/// Send one event; `false` means the consumer is gone.
async fn emit(events: &mpsc::Sender<ValidationEvent>, event: ValidationEvent) -> bool {
    events.send(event).await.is_ok()
}
