use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use freshscan_core::{ErrorResponse, ScanError};
use freshscan_media::ScanPipeline;

/// Shared application state for API handlers.
pub struct AppState {
    pub pipeline: ScanPipeline,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/scan", post(scan))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "freshscan",
        "version": env!("CARGO_PKG_VERSION"),
        "detector": state.pipeline.detector_name(),
        "ocr": state.pipeline.recognizer_name(),
    }))
}

/// Scan one image. The body is the same JSON the `scan` command reads.
async fn scan(State(state): State<Arc<AppState>>, body: String) -> Response {
    match state.pipeline.scan_request(&body).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "Scan failed");
            } else {
                tracing::warn!(error = %e, "Rejected scan request");
            }
            (status, Json(ErrorResponse::from(&e))).into_response()
        }
    }
}

fn status_for(err: &ScanError) -> StatusCode {
    match err {
        ScanError::UndecodableImage { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        e if e.is_input_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
