//! File upload, URL, listing and deletion routes.
//!
//! Every response is a JSON envelope with a `success` flag and either a payload
//! or a `message`. Backend failures also carry the provider's error text in
//! `error`.

use std::future::Future;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Query, State, multipart::MultipartRejection,
        rejection::QueryRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::AppState;
use filegate_core::filename::{build_safe_filename, extension_lower, is_allowed_extension};
use filegate_core::storage::{PutInput, StorageError};

/// Listing size when `limit` is absent or not positive.
pub const DEFAULT_LIST_LIMIT: usize = 50;
/// Largest accepted `limit`; bigger values are clamped.
pub const MAX_LIST_LIMIT: usize = 500;

const FILE_FIELD: &str = "file";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Creates the file routes with the given request body limit.
pub fn routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/files/upload", post(upload_file))
        .route("/files/url", get(get_file_url))
        .route("/files/list", get(list_files))
        .route("/files", delete(delete_file))
        .layer(DefaultBodyLimit::max(body_limit))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for uploads.
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Key prefix for the new object.
    pub prefix: Option<String>,
    /// URL lifetime in minutes.
    pub expire_min: Option<String>,
}

/// Query parameters for URL generation.
#[derive(Debug, Default, Deserialize)]
pub struct UrlQuery {
    /// Object key.
    pub key: Option<String>,
    /// URL lifetime in minutes.
    pub expire_min: Option<String>,
}

/// Query parameters for listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Key prefix to list under.
    pub prefix: Option<String>,
    /// Maximum number of entries.
    pub limit: Option<String>,
}

/// Query parameters for deletion.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Object key.
    pub key: Option<String>,
}

/// The `file` part of an upload. Dropping it releases the buffered content.
struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message
        })),
    )
        .into_response()
}

fn backend_failure(status: StatusCode, message: &str, err: &StorageError) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "error": err.to_string()
        })),
    )
        .into_response()
}

/// Malformed query strings (repeated fields, invalid escapes).
fn query_failure(rejection: &QueryRejection) -> Response {
    warn!(error = %rejection, "Rejected query string");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "message": "invalid query",
            "error": rejection.body_text()
        })),
    )
        .into_response()
}

/// Runs a storage call under the request deadline.
///
/// When the client disconnects, axum drops the handler future and with it the
/// in-flight call.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, StorageError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| Err(StorageError::Timeout(limit)))
}

/// Trimmed, non-empty query value.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Positive whole minutes, else the default.
fn parse_expiry(raw: Option<&str>, default: Duration) -> Duration {
    non_empty(raw)
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|minutes| *minutes > 0)
        .map_or(default, |minutes| Duration::from_secs(minutes.saturating_mul(60)))
}

/// Positive limits are clamped to [`MAX_LIST_LIMIT`]; anything else is the default.
fn parse_limit(raw: Option<&str>) -> usize {
    match non_empty(raw).and_then(|v| v.parse::<i64>().ok()) {
        Some(n) if n > 0 => usize::try_from(n).map_or(MAX_LIST_LIMIT, |n| n.min(MAX_LIST_LIMIT)),
        _ => DEFAULT_LIST_LIMIT,
    }
}

/// Caller prefix (or the default) as `seg/seg/`, without `.` or `..` segments.
fn upload_prefix(raw: Option<&str>, default: &str) -> String {
    let raw = non_empty(raw).unwrap_or(default);
    let segments: Vec<&str> = raw
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();

    if segments.is_empty() {
        String::new()
    } else {
        format!("{}/", segments.join("/"))
    }
}

/// Reads fields until the `file` part is found.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<UploadedFile>, axum::extract::multipart::MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(String::from);
        let data = field.bytes().await?;

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            data,
        }));
    }
    Ok(None)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/files/upload`
/// Upload one file from the multipart field `file`.
async fn upload_file(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(e) => return query_failure(&e),
    };
    let Ok(mut multipart) = multipart else {
        return failure(StatusCode::BAD_REQUEST, "missing file field 'file'");
    };

    let file = match read_file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => return failure(StatusCode::BAD_REQUEST, "missing file field 'file'"),
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return failure(StatusCode::BAD_REQUEST, "file too large");
        }
        Err(e) => {
            warn!(error = %e, "Failed to read multipart body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": "invalid multipart body",
                    "error": e.body_text()
                })),
            )
                .into_response();
        }
    };

    let size = u64::try_from(file.data.len()).unwrap_or(u64::MAX);
    if size == 0 {
        return failure(StatusCode::BAD_REQUEST, "empty file");
    }
    if size > state.uploads.max_bytes {
        return failure(StatusCode::BAD_REQUEST, "file too large");
    }

    let ext = extension_lower(&file.filename);
    if !is_allowed_extension(&ext, &state.uploads.allowed_extensions) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "file extension not allowed",
                "ext": ext
            })),
        )
            .into_response();
    }

    let safe_name = match build_safe_filename(&file.filename) {
        Ok(name) => name,
        Err(e) => {
            error!(error = %e, "Failed to build safe filename");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "filename error");
        }
    };

    let key = format!(
        "{}{safe_name}",
        upload_prefix(query.prefix.as_deref(), &state.uploads.default_prefix)
    );
    let content_type = file
        .content_type
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    let input = PutInput::from_bytes(key, file.data, content_type);
    let limit = state.uploads.call_timeout;

    let mut info = match bounded(limit, state.storage.put(input)).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "Failed to upload file");
            return backend_failure(StatusCode::INTERNAL_SERVER_ERROR, "upload failed", &e);
        }
    };

    let expiry = parse_expiry(query.expire_min.as_deref(), state.uploads.default_expiry);
    match bounded(limit, state.storage.get_url(&info.key, expiry)).await {
        Ok(url) => info.url = Some(url),
        Err(e) => warn!(key = %info.key, error = %e, "Uploaded file has no URL"),
    }

    info!(key = %info.key, size = info.size, "File uploaded");

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "file": info
        })),
    )
        .into_response()
}

/// GET `/files/url`
/// Public or signed URL for a key. Signing does not check existence.
async fn get_file_url(
    State(state): State<AppState>,
    query: Result<Query<UrlQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(e) => return query_failure(&e),
    };
    let Some(key) = non_empty(query.key.as_deref()) else {
        return failure(StatusCode::BAD_REQUEST, "key required");
    };

    let expiry = parse_expiry(query.expire_min.as_deref(), state.uploads.default_expiry);
    match bounded(state.uploads.call_timeout, state.storage.get_url(key, expiry)).await {
        Ok(url) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "url": url
            })),
        )
            .into_response(),
        Err(e) => {
            error!(key = %key, error = %e, "Failed to get file URL");
            backend_failure(StatusCode::BAD_REQUEST, "get url failed", &e)
        }
    }
}

/// GET `/files/list`
/// Objects under a prefix, in provider order.
async fn list_files(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(e) => return query_failure(&e),
    };
    let prefix =
        non_empty(query.prefix.as_deref()).unwrap_or(state.uploads.default_prefix.as_str());
    let limit = parse_limit(query.limit.as_deref());

    match bounded(state.uploads.call_timeout, state.storage.list(prefix, limit)).await {
        Ok(files) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "files": files
            })),
        )
            .into_response(),
        Err(e) => {
            error!(prefix = %prefix, error = %e, "Failed to list files");
            backend_failure(StatusCode::BAD_REQUEST, "list failed", &e)
        }
    }
}

/// DELETE `/files`
/// Remove one object.
async fn delete_file(
    State(state): State<AppState>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(e) => return query_failure(&e),
    };
    let Some(key) = non_empty(query.key.as_deref()) else {
        return failure(StatusCode::BAD_REQUEST, "key required");
    };

    match bounded(state.uploads.call_timeout, state.storage.delete(key)).await {
        Ok(()) => {
            info!(key = %key, "File deleted");
            (StatusCode::OK, Json(json!({ "success": true }))).into_response()
        }
        Err(e) => {
            error!(key = %key, error = %e, "Failed to delete file");
            backend_failure(StatusCode::BAD_REQUEST, "delete failed", &e)
        }
    }
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
