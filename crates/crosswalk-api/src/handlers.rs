//! Request handlers for the validation API.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::info;

use crosswalk_directory::{DirectoryClient, TokenCredentials, TokenProvider};
use crosswalk_profile::ProfileClient;
use crosswalk_recon::{ResumePoint, RunConfig, ValidationEngine};

use crate::error::ApiError;
use crate::models::StartValidationRequest;
use crate::router::ReconState;

/// Depth of the event channel between the engine task and the SSE stream.
/// A slow consumer backpressures the engine rather than buffering a run's
/// whole output.
const EVENT_CHANNEL_DEPTH: usize = 64;

/// Start a validation run.
///
/// Responds with a server-sent-event stream carrying the run's tagged
/// events; the connection stays open until a `complete` or `error` event,
/// or until the client disconnects (which cancels the run cooperatively:
/// dropping the stream closes the event channel the engine writes to).
pub async fn start_validation(
    State(state): State<ReconState>,
    Json(request): Json<StartValidationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !request.has_required_parameters() {
        return Err(ApiError::MissingParameters);
    }

    let timeout = Duration::from_secs(state.request_timeout_secs);

    let credentials = TokenCredentials {
        client_id: request.client_id.clone(),
        client_secret: request.client_secret.clone(),
        token_endpoint: request.token_endpoint.clone(),
        scopes: request
            .scopes
            .split_whitespace()
            .map(str::to_string)
            .collect(),
    };
    let auth_http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {e}")))?;
    let auth = TokenProvider::new(credentials, auth_http);

    let directory = DirectoryClient::new(request.tenant_url.clone(), auth, timeout)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let profiles = ProfileClient::new(
        state.profile_store.base_url.clone(),
        state.profile_store.api_key.clone(),
        state.profile_store.secret.clone(),
        timeout,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    let resume = request.resume_from_cookie.as_ref().map(|cursor| ResumePoint {
        cursor: cursor.clone(),
        progress: request.resume_progress.clone().unwrap_or_default(),
        last_processed_date: request.resume_last_processed_date,
    });

    let config = RunConfig {
        concurrency: request.concurrency,
        page_size: request.page_size,
        max_records: request.max_users,
        start_date: request.start_date,
        resume,
        spot_check: request.spot_check.clone(),
        ..RunConfig::default()
    };

    info!(
        tenant_url = %request.tenant_url,
        page_size = request.page_size,
        concurrency = request.concurrency,
        resuming = request.resume_from_cookie.is_some(),
        spot_check = request.spot_check.is_some(),
        "Starting validation run"
    );

    let engine = ValidationEngine::new(directory, profiles, Arc::clone(&state.artifacts), config);
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_DEPTH);
    let cancel = Arc::new(AtomicBool::new(false));
    tokio::spawn(engine.run(tx, cancel));

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(&event));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Download the CSV artifact for a finished (or aborted) run.
pub async fn download_artifact(
    State(state): State<ReconState>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let artifact = state
        .artifacts
        .get(&job_id)
        .ok_or(ApiError::ArtifactNotFound)?;

    info!(job_id = %job_id, bytes = artifact.content.len(), "Serving artifact");
    let filename = format!("recon-validation-{job_id}.csv");
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (header::CACHE_CONTROL, "no-cache".to_string()),
    ];

    Ok((headers, artifact.content).into_response())
}
