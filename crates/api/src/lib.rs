//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The `/health` check
//! - The `/files` upload, URL, list and delete endpoints
//! - Shared application state

pub mod routes;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use filegate_core::storage::Storage;
use filegate_shared::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Prefix used when the caller does not supply one.
pub const DEFAULT_PREFIX: &str = "uploads/";

/// Deadline for every individual storage call.
pub const STORAGE_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Multipart framing allowance on top of the maximum file size.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Request-independent rules applied by the file handlers.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Maximum accepted file size in bytes.
    pub max_bytes: u64,
    /// Allowed extensions, lowercase without the dot.
    pub allowed_extensions: BTreeSet<String>,
    /// Prefix applied when the caller sends none.
    pub default_prefix: String,
    /// URL lifetime when `expire_min` is absent or invalid.
    pub default_expiry: Duration,
    /// Deadline for each storage call.
    pub call_timeout: Duration,
}

impl UploadPolicy {
    /// Builds the policy from loaded configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_bytes: config.upload.max_bytes(),
            allowed_extensions: config.upload.allowed_extensions.clone(),
            default_prefix: DEFAULT_PREFIX.to_string(),
            default_expiry: config.storage.default_url_expiry(),
            call_timeout: STORAGE_CALL_TIMEOUT,
        }
    }

    /// Request body limit for upload routes.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_bytes.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(usize::MAX)
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage adapter selected at startup.
    pub storage: Arc<dyn Storage>,
    /// Upload validation rules.
    pub uploads: Arc<UploadPolicy>,
}

impl AppState {
    /// Creates the state from an adapter and upload rules.
    pub fn new(storage: Arc<dyn Storage>, uploads: UploadPolicy) -> Self {
        Self {
            storage,
            uploads: Arc::new(uploads),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes(state.uploads.body_limit()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
