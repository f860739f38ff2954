//! Validation API router configuration.
//!
//! Configures routes for the validation endpoints:
//! - POST /api/recon/validate - Start a run (server-sent-event response)
//! - GET /api/recon/download/:job_id - Download the run's CSV artifact

use crate::handlers::{download_artifact, start_validation};
use axum::routing::{get, post};
use axum::Router;
use crosswalk_recon::JobArtifactStore;
use std::sync::Arc;

/// Connection settings for the profile store.
///
/// Credentials are server-side configuration, never taken from requests.
/// The [`Debug`] impl redacts the secret.
#[derive(Clone)]
pub struct ProfileStoreSettings {
    /// Profile store base URL.
    pub base_url: String,
    /// API key presented on every call.
    pub api_key: String,
    /// API secret presented on every call.
    pub secret: String,
}

impl std::fmt::Debug for ProfileStoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStoreSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Application state for the validation routes.
#[derive(Clone)]
pub struct ReconState {
    /// Shared artifact store, injected into both handlers.
    pub artifacts: Arc<dyn JobArtifactStore>,
    /// Profile store connection settings.
    pub profile_store: ProfileStoreSettings,
    /// Timeout applied to outbound requests, in seconds.
    pub request_timeout_secs: u64,
}

/// Build the validation router with the given state.
pub fn recon_router(state: ReconState) -> Router {
    Router::new()
        .route("/api/recon/validate", post(start_validation))
        .route("/api/recon/download/:job_id", get(download_artifact))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosswalk_recon::InMemoryArtifactStore;

    #[test]
    fn test_router_builds() {
        let state = ReconState {
            artifacts: Arc::new(InMemoryArtifactStore::new()),
            profile_store: ProfileStoreSettings {
                base_url: "https://profiles.example.com".to_string(),
                api_key: "key".to_string(),
                secret: "secret".to_string(),
            },
            request_timeout_secs: 30,
        };
        let _router = recon_router(state);
    }

    #[test]
    fn test_profile_settings_debug_redacts_secret() {
        let settings = ProfileStoreSettings {
            base_url: "https://profiles.example.com".to_string(),
            api_key: "key".to_string(),
            secret: "hunter2".to_string(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
