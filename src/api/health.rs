//! Health check endpoints

use axum::extract::State;

use crate::{error::AppResult, AppState};

/// Liveness check endpoint
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = String, content_type = "text/plain")
    )
)]
pub async fn health_check() -> &'static str {
    "ok"
}

/// Readiness check endpoint (checks database connectivity)
#[utoipa::path(
    get,
    path = "/readyz",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = String, content_type = "text/plain"),
        (status = 500, description = "Database unreachable", body = crate::error::ErrorResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<&'static str> {
    state.services.books.ping().await?;
    Ok("ok")
}
