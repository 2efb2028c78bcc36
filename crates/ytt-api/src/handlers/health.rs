//! Health check handler.

use axum::Json;
use serde::Serialize;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe. Not rate limited, no side effects.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
