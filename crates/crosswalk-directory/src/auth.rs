//! OAuth2 client-credentials token provider for the directory service.

use crate::error::{DirectoryError, DirectoryResult};
use crosswalk_core::RetryPolicy;
use reqwest::RequestBuilder;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Seconds before nominal expiry at which a cached token is refreshed.
const EXPIRY_BUFFER_SECS: u64 = 60;

/// Retry attempts for token endpoint calls.
const TOKEN_RETRIES: u32 = 2;

/// Base backoff for token endpoint retries.
const TOKEN_RETRY_BASE: Duration = Duration::from_secs(2);

/// Client-credentials grant configuration for the directory token endpoint.
///
/// The [`Debug`] impl redacts the client secret to prevent accidental
/// credential exposure in log output.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_endpoint", &self.token_endpoint)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Cached access token with its issue time.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    obtained_at: Instant,
    expires_in: Option<u64>,
}

impl CachedToken {
    /// Whether the token is within the refresh buffer of its expiry.
    fn needs_refresh(&self) -> bool {
        match self.expires_in {
            Some(secs) => {
                self.obtained_at.elapsed()
                    >= Duration::from_secs(secs.saturating_sub(EXPIRY_BUFFER_SECS))
            }
            None => false,
        }
    }
}

/// Token provider for the directory service.
///
/// Fetches a client-credentials access token and caches it, refreshing
/// proactively 60 seconds before nominal expiry. Token endpoint failures
/// are retried twice with a 2 second base backoff before surfacing as
/// [`DirectoryError::Auth`].
#[derive(Debug, Clone)]
pub struct TokenProvider {
    credentials: TokenCredentials,
    /// Cached token (shared across clones).
    cached: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests.
    http_client: reqwest::Client,
    retry: RetryPolicy,
}

impl TokenProvider {
    /// Create a new token provider.
    #[must_use]
    pub fn new(credentials: TokenCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            cached: Arc::new(RwLock::new(None)),
            http_client,
            retry: RetryPolicy::new(TOKEN_RETRIES, TOKEN_RETRY_BASE),
        }
    }

    /// Override the token-endpoint retry policy (tests use a zero delay).
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get a bearer token, fetching or refreshing as needed.
    pub async fn get_bearer_token(&self) -> DirectoryResult<String> {
        // Check cache first.
        {
            let cache = self.cached.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.needs_refresh() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        debug!(
            token_endpoint = %self.credentials.token_endpoint,
            "Fetching directory access token"
        );
        let response = self
            .retry
            .execute("Token refresh", || self.fetch_token())
            .await?;

        let access_token = response.access_token.clone();
        {
            let mut cache = self.cached.write().await;
            *cache = Some(CachedToken {
                access_token: response.access_token,
                obtained_at: Instant::now(),
                expires_in: response.expires_in,
            });
        }

        Ok(access_token)
    }

    /// Apply authentication to a request builder.
    pub async fn apply(&self, builder: RequestBuilder) -> DirectoryResult<RequestBuilder> {
        let token = self.get_bearer_token().await?;
        Ok(builder.bearer_auth(token))
    }

    /// Invalidate the cached token (e.g., on a 401 response).
    pub async fn invalidate(&self) {
        let mut cache = self.cached.write().await;
        *cache = None;
    }

    async fn fetch_token(&self) -> DirectoryResult<TokenResponse> {
        let mut form = vec![("grant_type", "client_credentials".to_string())];
        if !self.credentials.scopes.is_empty() {
            form.push(("scope", self.credentials.scopes.join(" ")));
        }

        let response = self
            .http_client
            .post(&self.credentials.token_endpoint)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&form)
            .send()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(DirectoryError::Auth(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DirectoryError::Auth(format!("Failed to parse token response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let credentials = TokenCredentials {
            client_id: "client-1".to_string(),
            client_secret: "super-secret".to_string(),
            token_endpoint: "https://idp.example.com/oauth/token".to_string(),
            scopes: vec!["directory:read".to_string()],
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("client-1"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_cached_token_refresh_buffer() {
        let fresh = CachedToken {
            access_token: "t".to_string(),
            obtained_at: Instant::now(),
            expires_in: Some(3600),
        };
        assert!(!fresh.needs_refresh());

        // A token with expiry inside the buffer must refresh immediately.
        let short_lived = CachedToken {
            access_token: "t".to_string(),
            obtained_at: Instant::now(),
            expires_in: Some(EXPIRY_BUFFER_SECS),
        };
        assert!(short_lived.needs_refresh());
    }

    #[test]
    fn test_cached_token_without_expiry_never_refreshes() {
        let token = CachedToken {
            access_token: "t".to_string(),
            obtained_at: Instant::now(),
            expires_in: None,
        };
        assert!(!token.needs_refresh());
    }
}
