//! Proportional per-page sampling for spot-check mode.

use crosswalk_directory::DirectoryRecord;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fraction of eligible records sampled from each page. A heuristic, not a
/// contract; runs sample at least one record per page while budget remains.
const PAGE_SAMPLE_RATIO: f64 = 0.3;

/// Spot-check parameters supplied with the start request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotCheckConfig {
    /// Total number of records to sample across the run.
    pub sample_size: usize,

    /// Record ids sampled by earlier runs, skipped before sampling.
    #[serde(default)]
    pub exclude_uids: Vec<String>,
}

/// Per-run sampling state.
#[derive(Debug)]
pub struct SpotCheckSampler {
    sample_size: usize,
    exclude: HashSet<String>,
    sampled_ids: Vec<String>,
}

impl SpotCheckSampler {
    /// Create a sampler from the request configuration.
    #[must_use]
    pub fn new(config: &SpotCheckConfig) -> Self {
        Self {
            sample_size: config.sample_size,
            exclude: config
                .exclude_uids
                .iter()
                .map(|id| id.to_lowercase())
                .collect(),
            sampled_ids: Vec::new(),
        }
    }

    /// How many more records may still be sampled.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.sample_size.saturating_sub(self.sampled_ids.len())
    }

    /// Ids sampled so far, in pick order.
    #[must_use]
    pub fn sampled_ids(&self) -> &[String] {
        &self.sampled_ids
    }

    /// Reduce one page to its random sample.
    ///
    /// Previously checked ids are dropped first; the pick count is
    /// proportional to the eligible count (at least one) and capped by the
    /// remaining budget. Returns an empty vector once the budget is spent
    /// or nothing on the page is eligible.
    pub fn sample_page(&mut self, records: Vec<DirectoryRecord>) -> Vec<DirectoryRecord> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Vec::new();
        }

        let mut eligible: Vec<DirectoryRecord> = records
            .into_iter()
            .filter(|r| !self.exclude.contains(&r.id.to_lowercase()))
            .collect();
        if eligible.is_empty() {
            return Vec::new();
        }

        let proportional = ((eligible.len() as f64) * PAGE_SAMPLE_RATIO).ceil() as usize;
        let count = remaining.min(proportional.max(1));

        eligible.shuffle(&mut rand::thread_rng());
        eligible.truncate(count);

        for record in &eligible {
            self.sampled_ids.push(record.id.clone());
        }
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> DirectoryRecord {
        DirectoryRecord {
            id: id.to_string(),
            user_name: None,
            email: None,
            given_name: None,
            surname: None,
            account_status: None,
            external_raw_id: None,
            external_id_has_dashes: None,
        }
    }

    fn page(count: usize) -> Vec<DirectoryRecord> {
        (0..count).map(|i| record(&format!("user-{i}"))).collect()
    }

    #[test]
    fn test_sample_is_proportional() {
        let mut sampler = SpotCheckSampler::new(&SpotCheckConfig {
            sample_size: 100,
            exclude_uids: vec![],
        });

        // ceil(10 * 0.3) = 3
        let sampled = sampler.sample_page(page(10));
        assert_eq!(sampled.len(), 3);
        assert_eq!(sampler.sampled_ids().len(), 3);
    }

    #[test]
    fn test_sample_at_least_one() {
        let mut sampler = SpotCheckSampler::new(&SpotCheckConfig {
            sample_size: 100,
            exclude_uids: vec![],
        });

        let sampled = sampler.sample_page(page(1));
        assert_eq!(sampled.len(), 1);
    }

    #[test]
    fn test_sample_capped_by_remaining_budget() {
        let mut sampler = SpotCheckSampler::new(&SpotCheckConfig {
            sample_size: 2,
            exclude_uids: vec![],
        });

        let first = sampler.sample_page(page(10));
        assert_eq!(first.len(), 2);
        assert_eq!(sampler.remaining(), 0);

        // Budget spent: later pages yield nothing.
        let second = sampler.sample_page(page(10));
        assert!(second.is_empty());
        assert_eq!(sampler.sampled_ids().len(), 2);
    }

    #[test]
    fn test_excluded_ids_are_skipped() {
        let mut sampler = SpotCheckSampler::new(&SpotCheckConfig {
            sample_size: 100,
            // Exclusion is case-insensitive.
            exclude_uids: vec!["USER-0".to_string(), "user-1".to_string()],
        });

        let sampled = sampler.sample_page(vec![record("user-0"), record("user-1"), record("user-2")]);
        assert_eq!(sampled.len(), 1);
        assert_eq!(sampled[0].id, "user-2");
    }

    #[test]
    fn test_all_excluded_yields_empty() {
        let mut sampler = SpotCheckSampler::new(&SpotCheckConfig {
            sample_size: 100,
            exclude_uids: vec!["user-0".to_string()],
        });

        let sampled = sampler.sample_page(vec![record("user-0")]);
        assert!(sampled.is_empty());
        assert_eq!(sampler.remaining(), 100);
    }

    #[test]
    fn test_sampled_ids_accumulate_across_pages() {
        let mut sampler = SpotCheckSampler::new(&SpotCheckConfig {
            sample_size: 10,
            exclude_uids: vec![],
        });

        sampler.sample_page(page(10));
        sampler.sample_page(page(10));
        assert_eq!(sampler.sampled_ids().len(), 6);
    }
}
