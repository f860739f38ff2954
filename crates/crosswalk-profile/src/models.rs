//! Wire models for the profile store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One record from the profile store.
///
/// A nonzero `error_code` means the store answered but does not know the
/// identifier; that is a successful lookup of an orphan, not a transport
/// failure. Records are fetched fresh for each comparison and never cached
/// beyond one page's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Primary key in the profile store; stored with or without dashes.
    #[serde(default)]
    pub external_id: String,

    /// 0 = found; nonzero codes mean not-found or an API-level error.
    #[serde(default)]
    pub error_code: i64,

    /// Human-readable error description when `error_code` is nonzero.
    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub is_active: Option<bool>,

    #[serde(default)]
    pub is_registered: Option<bool>,

    #[serde(default)]
    pub is_verified: Option<bool>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl ProfileRecord {
    /// Whether the profile store reported this record as found.
    #[must_use]
    pub fn found(&self) -> bool {
        self.error_code == 0
    }

    /// Most recent activity timestamp, preferring update over login over
    /// creation. Used as the resume watermark.
    #[must_use]
    pub fn latest_activity(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.last_login_at).or(self.created_at)
    }
}

/// Search response envelope (batch lookup).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileSearchResponse {
    #[serde(default)]
    pub error_code: i64,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub results: Vec<ProfileRecord>,

    /// Continuation token; present when the search has more results.
    #[serde(default)]
    pub next_cursor_id: Option<String>,
}
