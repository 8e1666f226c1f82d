//! Health check endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always `true` while the process serves requests.
    pub ok: bool,
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use filegate_core::storage::MockStorage;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::{AppState, UploadPolicy, routes::api_routes};

    #[tokio::test]
    async fn test_health_check() {
        let state = AppState::new(
            Arc::new(MockStorage::new()),
            UploadPolicy {
                max_bytes: 1024,
                allowed_extensions: std::collections::BTreeSet::new(),
                default_prefix: crate::DEFAULT_PREFIX.to_string(),
                default_expiry: std::time::Duration::from_secs(900),
                call_timeout: crate::STORAGE_CALL_TIMEOUT,
            },
        );
        let app = api_routes(2048).with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        assert_eq!(&body[..], br#"{"ok":true}"#);
    }
}
