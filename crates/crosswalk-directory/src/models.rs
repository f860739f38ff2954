//! Wire models for the directory service.

use serde::{Deserialize, Serialize};

/// One identity record from the directory, restricted to the fields the
/// validation engine projects.
///
/// Records are immutable snapshots of the directory state at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRecord {
    /// Stable directory identifier (dashed UUID form).
    pub id: String,

    /// Login name; usually the primary email address.
    #[serde(default)]
    pub user_name: Option<String>,

    /// Contact email address.
    #[serde(default)]
    pub email: Option<String>,

    /// First name.
    #[serde(default)]
    pub given_name: Option<String>,

    /// Last name.
    #[serde(default)]
    pub surname: Option<String>,

    /// Account lifecycle status ("active" / "inactive").
    #[serde(default)]
    pub account_status: Option<String>,

    /// Raw cross-system identifier (undashed form), stored as an indexed
    /// string field. Absent when the record was never linked.
    #[serde(default)]
    pub external_raw_id: Option<String>,

    /// Whether the external identifier was stored in dashed form.
    #[serde(default)]
    pub external_id_has_dashes: Option<bool>,
}

/// One page of a directory search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySearchResponse {
    /// Records on this page. An empty page ends pagination.
    #[serde(default)]
    pub results: Vec<DirectoryRecord>,

    /// Number of records on this page.
    #[serde(default)]
    pub result_count: i64,

    /// Opaque cursor for the next page; absent on the last page.
    #[serde(default)]
    pub next_cursor: Option<String>,

    /// Total matching records, when the server reports it.
    #[serde(default)]
    pub total_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_sparse_fields() {
        let record: DirectoryRecord = serde_json::from_str(
            r#"{"id": "01234567-89ab-cdef-0123-456789abcdef", "userName": "a@example.com"}"#,
        )
        .unwrap();
        assert_eq!(record.id, "01234567-89ab-cdef-0123-456789abcdef");
        assert_eq!(record.user_name.as_deref(), Some("a@example.com"));
        assert!(record.external_raw_id.is_none());
        assert!(record.account_status.is_none());
    }

    #[test]
    fn test_search_response_without_cursor_is_last_page() {
        let response: DirectorySearchResponse =
            serde_json::from_str(r#"{"results": [], "resultCount": 0}"#).unwrap();
        assert!(response.results.is_empty());
        assert!(response.next_cursor.is_none());
    }

    #[test]
    fn test_search_response_camel_case_round_trip() {
        let response: DirectorySearchResponse = serde_json::from_str(
            r#"{
                "results": [{"id": "x", "externalRawId": "abc", "externalIdHasDashes": false}],
                "resultCount": 1,
                "nextCursor": "cursor-1",
                "totalCount": 10
            }"#,
        )
        .unwrap();
        assert_eq!(response.results[0].external_raw_id.as_deref(), Some("abc"));
        assert_eq!(response.next_cursor.as_deref(), Some("cursor-1"));
        assert_eq!(response.total_count, Some(10));
    }
}
