// HTTP request handlers
use crate::presentation::app_state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Report InfluxDB liveness; 503 when the instance cannot be reached
pub async fn ping(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.influx.ping().await.ok() {
        Some(status) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok", "influx": status })),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "unreachable" })),
        ),
    }
}
