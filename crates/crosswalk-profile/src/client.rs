//! Profile store HTTP client (reqwest-based).

use crate::error::{ProfileError, ProfileResult};
use crate::models::{ProfileRecord, ProfileSearchResponse};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Number of identifiers per batch search chunk. The store caps query
/// length, so larger id sets are split.
const BATCH_CHUNK_SIZE: usize = 50;

/// Profile store client.
///
/// Authenticates with an API key/secret pair carried as form fields on
/// every call (the store's protocol); credentials are configured
/// server-side and never taken from run requests.
#[derive(Clone)]
pub struct ProfileClient {
    base_url: String,
    api_key: String,
    secret: String,
    http_client: Client,
}

impl std::fmt::Debug for ProfileClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl ProfileClient {
    /// Create a new profile store client.
    pub fn new(
        base_url: String,
        api_key: String,
        secret: String,
        timeout: Duration,
    ) -> ProfileResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("crosswalk-profile/1.0")
            .build()
            .map_err(|e| {
                ProfileError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(base_url, api_key, secret, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(
        base_url: String,
        api_key: String,
        secret: String,
        http_client: Client,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            secret,
            http_client,
        }
    }

    /// Batch-resolve profiles for a set of external identifiers.
    ///
    /// Identifiers are split into chunks of 50 and resolved with one "IN"
    /// query per chunk, transparently following any continuation token. The
    /// merged result map is keyed by lowercased identifier.
    ///
    /// A failed chunk (transport error or API-level error code) is logged
    /// and skipped; its identifiers stay absent from the map, which is
    /// what routes them to the individual fallback. No retry happens here.
    pub async fn batch_lookup(&self, ids: &[String]) -> HashMap<String, ProfileRecord> {
        let mut merged = HashMap::new();
        if ids.is_empty() {
            return merged;
        }

        for (chunk_index, chunk) in ids.chunks(BATCH_CHUNK_SIZE).enumerate() {
            let quoted: Vec<String> = chunk.iter().map(|id| format!("\"{id}\"")).collect();
            let query = format!(
                "SELECT externalId, email, firstName, lastName, isActive, isRegistered, \
                 isVerified, createdAt, updatedAt, lastLoginAt FROM profiles \
                 WHERE externalId IN ({})",
                quoted.join(",")
            );

            match self.search_chunk(&query).await {
                Ok(records) => {
                    for record in records {
                        merged.insert(record.external_id.to_lowercase(), record);
                    }
                }
                Err(error) => {
                    warn!(
                        chunk = chunk_index,
                        error = %error,
                        "Batch profile search failed for chunk; ids fall through to individual lookup"
                    );
                }
            }
        }

        debug!(
            requested = ids.len(),
            resolved = merged.len(),
            "Batch profile lookup finished"
        );
        merged
    }

    /// Fetch a single profile by external identifier.
    ///
    /// Used only for identifiers the batch lookup did not return. A store
    /// answer with a nonzero error code still deserializes into a record;
    /// only transport and parse failures are errors.
    pub async fn individual_lookup(&self, id: &str) -> ProfileResult<ProfileRecord> {
        debug!(external_id = id, "Individual profile lookup");
        let url = format!("{}/api/profiles/get", self.base_url);
        let form = [
            ("apiKey", self.api_key.as_str()),
            ("secret", self.secret.as_str()),
            ("externalId", id),
            ("format", "json"),
        ];

        let response = self.http_client.post(&url).form(&form).send().await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ProfileError::Parse(format!("profile get response: {e}")))
    }

    /// Run one chunk's search query, following continuation tokens until
    /// the store reports no more results.
    async fn search_chunk(&self, query: &str) -> ProfileResult<Vec<ProfileRecord>> {
        let mut records = Vec::new();
        let mut response = self.post_search(&[("query", query)]).await?;

        loop {
            if response.error_code != 0 {
                return Err(ProfileError::Api {
                    code: response.error_code,
                    message: response.error_message.unwrap_or_default(),
                });
            }
            records.extend(response.results);

            match response.next_cursor_id {
                Some(cursor) => {
                    response = self.post_search(&[("cursorId", cursor.as_str())]).await?;
                }
                None => break,
            }
        }

        Ok(records)
    }

    async fn post_search(&self, params: &[(&str, &str)]) -> ProfileResult<ProfileSearchResponse> {
        let url = format!("{}/api/profiles/search", self.base_url);
        let mut form = vec![
            ("apiKey", self.api_key.as_str()),
            ("secret", self.secret.as_str()),
            ("format", "json"),
        ];
        form.extend_from_slice(params);

        let response = self.http_client.post(&url).form(&form).send().await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ProfileError::Parse(format!("profile search response: {e}")))
    }
}
