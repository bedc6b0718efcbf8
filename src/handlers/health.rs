// src/handlers/health.rs

use axum::{Json, response::IntoResponse};

/// Liveness probe.
pub async fn hello() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Hello from the quiz backend (SQLite question DB)"
    }))
}
