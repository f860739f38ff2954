//! Request models for the validation API.

use chrono::{DateTime, Utc};
use crosswalk_recon::{RunProgress, SpotCheckConfig};
use serde::Deserialize;

fn default_scopes() -> String {
    "directory:read".to_string()
}

fn default_concurrency() -> usize {
    crosswalk_recon::config::DEFAULT_CONCURRENCY
}

fn default_page_size() -> u32 {
    crosswalk_recon::config::DEFAULT_PAGE_SIZE
}

/// Body of `POST /api/recon/validate`.
///
/// Directory connection parameters arrive with the request; profile store
/// credentials are server-side configuration. The [`Debug`] impl redacts
/// the client secret.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartValidationRequest {
    /// Directory base URL.
    #[serde(default)]
    pub tenant_url: String,

    /// OAuth2 client id for the directory.
    #[serde(default)]
    pub client_id: String,

    /// OAuth2 client secret for the directory.
    #[serde(default)]
    pub client_secret: String,

    /// OAuth2 token endpoint.
    #[serde(default)]
    pub token_endpoint: String,

    /// Space-separated scopes requested with the token.
    #[serde(default = "default_scopes")]
    pub scopes: String,

    /// Individual-lookup concurrency (clamped to 5–100).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Directory page size.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Optional hard cap on processed records.
    #[serde(default)]
    pub max_users: Option<u64>,

    /// Lower bound for the directory query filter (fresh-run fallback for
    /// an expired resume cursor).
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// Cursor from a previously emitted checkpoint.
    #[serde(default)]
    pub resume_from_cookie: Option<String>,

    /// Counter snapshot from the same checkpoint.
    #[serde(default)]
    pub resume_progress: Option<RunProgress>,

    /// Activity watermark from the same checkpoint.
    #[serde(default)]
    pub resume_last_processed_date: Option<DateTime<Utc>>,

    /// Spot-check mode instead of a full scan.
    #[serde(default)]
    pub spot_check: Option<SpotCheckConfig>,
}

impl StartValidationRequest {
    /// Whether every required connection parameter is present.
    #[must_use]
    pub fn has_required_parameters(&self) -> bool {
        !self.tenant_url.is_empty()
            && !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.token_endpoint.is_empty()
    }
}

impl std::fmt::Debug for StartValidationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartValidationRequest")
            .field("tenant_url", &self.tenant_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_endpoint", &self.token_endpoint)
            .field("scopes", &self.scopes)
            .field("concurrency", &self.concurrency)
            .field("page_size", &self.page_size)
            .field("max_users", &self.max_users)
            .field("resuming", &self.resume_from_cookie.is_some())
            .field("spot_check", &self.spot_check)
            .finish()
    }
}
