//! Health check route handler

use crate::{api::types::HealthCheckResponse, server::AppState};
use axum::{extract::State, Json};
use tracing::warn;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service status", body = HealthCheckResponse),
    ),
    tag = "health",
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let database_reachable = match state.database.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthCheckResponse {
        status: if database_reachable { "healthy" } else { "degraded" }.to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now(),
        database_reachable,
    })
}
