/// Health check endpoint
///
/// ```text
/// GET /api/health
/// ```
///
/// ```json
/// { "status": "OK", "timestamp": "2025-02-01T09:00:00Z", "version": "0.1.0" }
/// ```
///
/// The store is pinged on every call; when it does not answer the status
/// reads `DEGRADED` but the endpoint still responds 200 so the process stays
/// observable.

use crate::app::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use gantt_shared::wire::HealthResponse;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.ping().await {
        Ok(()) => "OK",
        Err(e) => {
            tracing::warn!(backend = state.store.backend(), error = %e, "Store health check failed");
            "DEGRADED"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
