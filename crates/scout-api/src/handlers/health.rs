//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    /// "configured", or "simulated" when runs fall back to the fixed report
    pub analysis_service: String,
    pub realtime_connections: usize,
}

/// Readiness check endpoint (readiness probe).
///
/// An unconfigured analysis service is not a failure: runs still complete
/// with simulated analysis.
pub async fn ready(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let analysis_service = if state.pipeline.gateway().is_configured() {
        "configured"
    } else {
        "simulated"
    };

    Json(ReadinessResponse {
        status: "ready".to_string(),
        checks: ReadinessChecks {
            analysis_service: analysis_service.to_string(),
            realtime_connections: state.hub.connection_count().await,
        },
    })
}
