// HTTP request handlers
use crate::infrastructure::chunked_json::stream_snapshots;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest snapshot, or 503 until the first tick has published
pub async fn latest_snapshot(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);

    let result = match state.snapshots.latest() {
        Some(snapshot) => json_response(StatusCode::OK, snapshot.as_ref(), compress).await,
        None => {
            let body = serde_json::json!({ "error": "no snapshot yet" });
            json_response(StatusCode::SERVICE_UNAVAILABLE, &body, compress).await
        }
    };

    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream the current snapshot and every newer one
pub async fn stream_latest(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    stream_snapshots(state.snapshots.clone().into_changes(), compress)
}
