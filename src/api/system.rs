//! Liveness and readiness.

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthResponse};

/// GET /api/health
/// Returns 503 when the database does not answer
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            false
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: if database { "ok" } else { "degraded" },
            database,
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        })),
    )
}
