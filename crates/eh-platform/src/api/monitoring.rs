//! Monitoring API

use axum::{routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

/// Liveness response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "UP" while the process serves requests
    pub status: String,
    pub version: String,
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "monitoring",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create monitoring router
pub fn monitoring_router() -> Router {
    Router::new().route("/health", get(health))
}
