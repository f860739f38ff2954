//! # Validation Engine
//!
//! Streaming cross-system data-integrity checking between the directory
//! service and the profile store.
//!
//! ## Overview
//!
//! The engine provides:
//! - Full-scan mode comparing every directory record against the profile store
//! - Randomized spot-check mode sampling a bounded subset per page
//! - Discrepancy classification into eight fixed mismatch kinds
//! - Incremental event streaming (progress, mismatch, checkpoint, complete, error)
//! - Checkpointed resume across interrupted runs
//! - A TTL-evicted store for downloadable CSV artifacts
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                        ValidationEngine                            │
//! ├────────────────────────────────────────────────────────────────────┤
//! │                                                                    │
//! │  ┌───────────────┐   page    ┌───────────────────────────────┐    │
//! │  │    Fetcher    │══════════►│           Comparer            │    │
//! │  │ (directory    │ channel   │  batch resolve → fallback →   │    │
//! │  │  pagination,  │ depth 1   │  compare → emit events        │    │
//! │  │  token refresh│           └───────────────┬───────────────┘    │
//! │  └───────────────┘                           │                    │
//! │                                              ▼                    │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐        │
//! │  │  Checkpoint   │   │  RunProgress  │   │  CSV Artifact │        │
//! │  │  (per page)   │   │   counters    │   │  (TTL store)  │        │
//! │  └───────────────┘   └───────────────┘   └───────────────┘        │
//! │                                                                    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fetcher runs one page ahead of the comparer (the channel's depth
//! bounds the lookahead), so directory I/O overlaps with batch resolution
//! and comparison of the previous page.
//!
//! ## Usage
//!
//! ```ignore
//! use crosswalk_recon::{RunConfig, ValidationEngine, ValidationEvent};
//!
//! let engine = ValidationEngine::new(directory, profiles, artifacts, RunConfig::default());
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//! let cancel = Arc::new(AtomicBool::new(false));
//! tokio::spawn(engine.run(tx, cancel));
//!
//! while let Some(event) = rx.recv().await {
//!     match event {
//!         ValidationEvent::Mismatch(m) => println!("{}: {}", m.directory_record_id, m.mismatch_type),
//!         ValidationEvent::Complete(summary) => break,
//!         _ => {}
//!     }
//! }
//! ```

pub mod artifact;
pub mod checkpoint;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod progress;
pub mod report;
pub mod sample;

// Re-export main types
pub use artifact::{new_job_id, InMemoryArtifactStore, JobArtifact, JobArtifactStore};
pub use checkpoint::Checkpoint;
pub use compare::{compare, Finding, MismatchKind};
pub use config::{ResumePoint, RunConfig};
pub use engine::ValidationEngine;
pub use error::EngineError;
pub use events::{
    ErrorNotice, ProgressUpdate, RunSummary, ValidationEvent, ValidationMismatch,
};
pub use progress::{RecordOutcome, RunProgress};
pub use sample::{SpotCheckConfig, SpotCheckSampler};
