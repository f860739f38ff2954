//! Ephemeral storage for downloadable run artifacts.
//!
//! Each run owns exactly one key (its job id) and only ever writes its own
//! entry. The store is injected into both the start- and download-handlers
//! rather than living in a process-wide global.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::RwLock;

/// How long a finished artifact stays downloadable, in seconds.
pub const ARTIFACT_TTL_SECS: i64 = 3600;

/// One run's downloadable result file.
#[derive(Debug, Clone)]
pub struct JobArtifact {
    /// Unique job key (`recon-<epoch millis>-<random suffix>`).
    pub job_id: String,
    /// Rendered CSV content.
    pub content: String,
    /// Creation time; drives TTL eviction.
    pub created_at: DateTime<Utc>,
}

/// Keyed storage for run artifacts.
///
/// Implementations are process-lifetime only; artifacts do not survive
/// restarts.
pub trait JobArtifactStore: Send + Sync {
    /// Store an artifact under its job id.
    fn put(&self, artifact: JobArtifact);

    /// Fetch an artifact; `None` when unknown or past its TTL.
    fn get(&self, job_id: &str) -> Option<JobArtifact>;

    /// Drop artifacts older than the TTL. Swept lazily at job creation.
    fn sweep_expired(&self);
}

/// In-memory artifact store with TTL eviction.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    entries: RwLock<HashMap<String, JobArtifact>>,
}

impl InMemoryArtifactStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobArtifactStore for InMemoryArtifactStore {
    fn put(&self, artifact: JobArtifact) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(artifact.job_id.clone(), artifact);
        }
    }

    fn get(&self, job_id: &str) -> Option<JobArtifact> {
        let entries = self.entries.read().ok()?;
        let artifact = entries.get(job_id)?;
        // Expired-but-unswept entries must not be served.
        if Utc::now() - artifact.created_at > Duration::seconds(ARTIFACT_TTL_SECS) {
            return None;
        }
        Some(artifact.clone())
    }

    fn sweep_expired(&self) {
        let cutoff = Utc::now() - Duration::seconds(ARTIFACT_TTL_SECS);
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, artifact| artifact.created_at >= cutoff);
        }
    }
}

/// Generate a job id: `recon-<epoch millis>-<6 random base36 chars>`.
#[must_use]
pub fn new_job_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("recon-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_created_at(minutes_ago: i64) -> JobArtifact {
        JobArtifact {
            job_id: format!("recon-test-{minutes_ago}"),
            content: "DirectoryID,ExternalID\n".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_put_then_get() {
        let store = InMemoryArtifactStore::new();
        let artifact = artifact_created_at(0);
        let job_id = artifact.job_id.clone();
        store.put(artifact);

        let fetched = store.get(&job_id).unwrap();
        assert_eq!(fetched.job_id, job_id);
        assert!(fetched.content.starts_with("DirectoryID"));
    }

    #[test]
    fn test_get_unknown_job_is_none() {
        let store = InMemoryArtifactStore::new();
        assert!(store.get("recon-missing").is_none());
    }

    #[test]
    fn test_artifact_downloadable_before_ttl() {
        let store = InMemoryArtifactStore::new();
        let artifact = artifact_created_at(59);
        let job_id = artifact.job_id.clone();
        store.put(artifact);
        assert!(store.get(&job_id).is_some());
    }

    #[test]
    fn test_artifact_expired_after_ttl_even_without_sweep() {
        let store = InMemoryArtifactStore::new();
        let artifact = artifact_created_at(61);
        let job_id = artifact.job_id.clone();
        store.put(artifact);
        assert!(store.get(&job_id).is_none());
    }

    #[test]
    fn test_sweep_removes_only_expired_entries() {
        let store = InMemoryArtifactStore::new();
        let fresh = artifact_created_at(10);
        let stale = artifact_created_at(120);
        let fresh_id = fresh.job_id.clone();
        let stale_id = stale.job_id.clone();
        store.put(fresh);
        store.put(stale);

        store.sweep_expired();

        assert!(store.get(&fresh_id).is_some());
        assert!(store.get(&stale_id).is_none());
    }

    #[test]
    fn test_job_ids_are_unique_and_well_formed() {
        let a = new_job_id();
        let b = new_job_id();
        assert!(a.starts_with("recon-"));
        assert_eq!(a.rsplit('-').next().map(str::len), Some(6));
        assert_ne!(a, b);
    }
}
