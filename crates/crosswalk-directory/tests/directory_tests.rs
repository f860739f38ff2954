//! Integration tests for the directory client using wiremock.
//!
//! Cover token acquisition and caching, paginated search, the fixed field
//! projection, and error mapping.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{basic_auth, body_string_contains, method, path, query_param,
    query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crosswalk_directory::{DirectoryClient, DirectoryError, TokenCredentials, TokenProvider};

fn credentials(server: &MockServer) -> TokenCredentials {
    TokenCredentials {
        client_id: "client-1".to_string(),
        client_secret: "secret-1".to_string(),
        token_endpoint: format!("{}/oauth/token", server.uri()),
        scopes: vec!["directory:read".to_string()],
    }
}

fn client(server: &MockServer) -> DirectoryClient {
    let http = reqwest::Client::new();
    let auth = TokenProvider::new(credentials(server), http.clone());
    DirectoryClient::with_http_client(server.uri(), auth, http)
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(basic_auth("client-1", "secret-1"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-abc",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_single_page() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/directory/v1/users"))
        .and(query_param("_queryFilter", "true"))
        .and(query_param("_pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "01234567-89ab-cdef-0123-456789abcdef", "userName": "a@example.com"}
            ],
            "resultCount": 1
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let page = client.search("true", 100, None).await.unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, "01234567-89ab-cdef-0123-456789abcdef");
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_search_requests_fixed_field_projection() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/directory/v1/users"))
        .and(query_param(
            "_fields",
            "id,userName,email,givenName,surname,accountStatus,externalRawId,externalIdHasDashes",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [], "resultCount": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let page = client.search("true", 50, None).await.unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_search_follows_cursor() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/directory/v1/users"))
        .and(query_param_is_missing("_pagedResultsCookie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "user-1"}],
            "resultCount": 1,
            "nextCursor": "cursor-1"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/directory/v1/users"))
        .and(query_param("_pagedResultsCookie", "cursor-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "user-2"}],
            "resultCount": 1
        })))
        .mount(&server)
        .await;

    let client = client(&server);

    let first = client.search("true", 1, None).await.unwrap();
    assert_eq!(first.next_cursor.as_deref(), Some("cursor-1"));

    let second = client
        .search("true", 1, first.next_cursor.as_deref())
        .await
        .unwrap();
    assert_eq!(second.results[0].id, "user-2");
    assert!(second.next_cursor.is_none());
}

#[tokio::test]
async fn test_search_error_carries_status_and_body() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/directory/v1/users"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client(&server);
    match client.search("true", 100, None).await {
        Err(DirectoryError::Search { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("Expected Search error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_token_failure_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})),
        )
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let auth = TokenProvider::new(credentials(&server), http);
    match auth.get_bearer_token().await {
        Err(DirectoryError::Auth(message)) => {
            assert!(message.contains("401"), "unexpected message: {message}");
        }
        other => panic!("Expected Auth error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_token_is_cached_across_searches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-abc",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/directory/v1/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [], "resultCount": 0})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = client(&server);
    for _ in 0..3 {
        client.search("true", 10, None).await.unwrap();
    }
}

#[tokio::test]
async fn test_search_sends_bearer_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/directory/v1/users"))
        .and(wiremock::matchers::header("Authorization", "Bearer token-abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [], "resultCount": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.search("true", 10, None).await.unwrap();
}

#[tokio::test]
async fn test_new_normalizes_base_url() {
    let server = MockServer::start().await;

    let client = DirectoryClient::new(
        format!("{}/", server.uri()),
        TokenProvider::new(credentials(&server), reqwest::Client::new()),
        Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(client.base_url(), server.uri());
}
