//! Cursor-paginated directory search client (reqwest-based).

use crate::auth::TokenProvider;
use crate::error::{DirectoryError, DirectoryResult};
use crate::models::DirectorySearchResponse;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Field projection requested on every search: exactly the fields the
/// comparison rules consume.
const SEARCH_FIELDS: &str =
    "id,userName,email,givenName,surname,accountStatus,externalRawId,externalIdHasDashes";

/// Directory search client.
///
/// Wraps `reqwest::Client` with the directory's cursor-paged query protocol
/// and bearer authentication.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    /// Base URL of the directory service.
    base_url: String,
    /// Authentication handler.
    auth: TokenProvider,
    /// Underlying HTTP client.
    http_client: Client,
}

impl DirectoryClient {
    /// Create a new directory client.
    pub fn new(base_url: String, auth: TokenProvider, timeout: Duration) -> DirectoryResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("crosswalk-directory/1.0")
            .build()
            .map_err(|e| {
                DirectoryError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        // Normalize base URL: strip trailing slash.
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            auth,
            http_client,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: String, auth: TokenProvider, http_client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            auth,
            http_client,
        }
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Eagerly obtain (or refresh) a token, surfacing authentication
    /// failures before any paging starts.
    pub async fn authenticate(&self) -> DirectoryResult<()> {
        self.auth.get_bearer_token().await.map(drop)
    }

    /// Fetch one page of users matching `filter`.
    ///
    /// Always requests the fixed comparison field projection. An empty
    /// `results` array or an absent `next_cursor` in the response both
    /// signal the end of pagination.
    pub async fn search(
        &self,
        filter: &str,
        page_size: u32,
        cursor: Option<&str>,
    ) -> DirectoryResult<DirectorySearchResponse> {
        let url = format!("{}/directory/v1/users", self.base_url);
        debug!(
            filter,
            page_size,
            has_cursor = cursor.is_some(),
            "Directory search"
        );

        let mut query: Vec<(&str, String)> = vec![
            ("_queryFilter", filter.to_string()),
            ("_fields", SEARCH_FIELDS.to_string()),
            ("_pageSize", page_size.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("_pagedResultsCookie", cursor.to_string()));
        }

        let builder = self
            .http_client
            .get(&url)
            .query(&query)
            .header("Accept", "application/json");
        let builder = self.auth.apply(builder).await?;
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(DirectoryError::Search {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let page: DirectorySearchResponse = serde_json::from_str(&body)
            .map_err(|e| DirectoryError::Parse(format!("search response: {e}")))?;

        debug!(
            result_count = page.results.len(),
            has_more = page.next_cursor.is_some(),
            "Directory search returned"
        );
        Ok(page)
    }
}
