//! Error types for the validation API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error type for the validation API.
///
/// Only failures that happen before streaming begins map to HTTP statuses;
/// once the event stream is open, errors travel as `error` events instead.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required connection parameters missing from the start request.
    #[error("Missing required connection parameters")]
    MissingParameters,

    /// Unknown job id, or the artifact has passed its TTL.
    #[error("Job not found or CSV data has expired. Results expire after 1 hour.")]
    ArtifactNotFound,

    /// Client construction failed.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// JSON error body: `{"error": ...}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingParameters => StatusCode::BAD_REQUEST,
            Self::ArtifactNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
