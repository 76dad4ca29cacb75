//! HTTP handlers
//!
//! The download handler runs the whole pipeline for one request: validation,
//! admission, bounded downloads into a private staging area, archive assembly
//! and finally the zip response. The staging area is removed before the
//! response is sent, on success and on failure alike.

use crate::admission::admit_with;
use crate::archive::build_archive;
use crate::fetcher::fetch_all;
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::staging::StagingArea;
use crate::url::Whitelist;
use crate::RequestError;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Name under which the archive is offered to the caller
pub const ARCHIVE_FILE_NAME: &str = "ringtones.zip";

/// Body of `POST /api/download`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadRequest {
    /// Candidate URLs; entries that are not JSON strings are ignored
    #[serde(default)]
    pub urls: Vec<Value>,

    /// Maximum number of URLs to admit
    #[serde(default)]
    pub limit: Option<usize>,

    /// Maximum number of simultaneous downloads
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Domains the request may fetch from; required
    #[serde(default)]
    pub whitelist: Option<Vec<String>>,
}

impl DownloadRequest {
    /// Returns the string entries of `urls`, in order
    pub fn url_strings(&self) -> Vec<&str> {
        self.urls.iter().filter_map(Value::as_str).collect()
    }
}

/// Parameters of a request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest<'a> {
    pub urls: Vec<&'a str>,
    pub whitelist: Whitelist,
    pub limit: usize,
    pub concurrency: usize,
}

/// Validates a request against the service defaults
///
/// Checks run in a fixed order: whitelist, URLs, limit, concurrency. A
/// requested concurrency above `max_concurrency` is lowered to it.
pub fn validate_request<'a>(
    request: &'a DownloadRequest,
    default_limit: usize,
    default_concurrency: usize,
    max_concurrency: usize,
) -> Result<ValidatedRequest<'a>, RequestError> {
    let whitelist = Whitelist::new(request.whitelist.as_deref().unwrap_or_default())?;

    let urls = request.url_strings();
    if urls.is_empty() {
        return Err(RequestError::NoUrls);
    }

    let limit = request.limit.unwrap_or(default_limit);
    if limit == 0 {
        return Err(RequestError::InvalidLimit);
    }

    let requested = request.concurrency.unwrap_or(default_concurrency);
    if requested == 0 {
        return Err(RequestError::InvalidConcurrency);
    }
    let concurrency = requested.min(max_concurrency);
    if concurrency < requested {
        tracing::debug!(
            "Lowering concurrency from {} to {}",
            requested,
            concurrency
        );
    }

    Ok(ValidatedRequest {
        urls,
        whitelist,
        limit,
        concurrency,
    })
}

/// `POST /api/download`
pub async fn download(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DownloadRequest>,
) -> Result<Response, ApiError> {
    let fetch = &state.config.fetch;
    let validated = validate_request(
        &request,
        fetch.default_limit,
        fetch.default_concurrency,
        fetch.max_concurrency,
    )?;

    tracing::info!(
        "Download request: {} URLs, limit {}, concurrency {}, whitelist {:?}",
        validated.urls.len(),
        validated.limit,
        validated.concurrency,
        validated.whitelist.entries()
    );

    let admitted = admit_with(
        &validated.urls,
        &validated.whitelist,
        validated.limit,
        &state.robots,
    )
    .await?;

    let staging = StagingArea::create()?;
    let outcomes = fetch_all(
        &state.client,
        &admitted,
        &validated.whitelist,
        validated.concurrency,
        staging.path(),
    )
    .await;

    let archive = tokio::task::spawn_blocking(move || build_archive(&outcomes)).await;

    if let Err(e) = staging.close() {
        tracing::warn!("Failed to remove staging area: {}", e);
    }

    let archive = archive??;

    let disposition = format!("attachment; filename=\"{}\"", ARCHIVE_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}

/// `GET /`
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Ringtone downloader service. POST to /api/download"
    }))
}
