//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{extract_highlights, health, list_player_highlights, process_video, ready, reanalyze};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, rate_limit_middleware, request_id, request_logging, security_headers, RateLimiterCache};
use crate::state::AppState;
use crate::ws::{ws_analytics, ws_global, ws_highlights, ws_player, ws_players};

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let pipeline_routes = Router::new()
        .route("/process-video", post(process_video))
        .route("/videos/:asset_id/reanalyze", post(reanalyze))
        .route("/videos/:asset_id/highlights", post(extract_highlights));

    let highlight_routes = Router::new()
        .route("/players/:player_id/highlights", get(list_player_highlights));

    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(pipeline_routes)
        .merge(highlight_routes)
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware));

    let ws_routes = Router::new()
        .route("/realtime", get(ws_global))
        .route("/realtime/players", get(ws_players))
        .route("/realtime/player/:player_id", get(ws_player))
        .route("/realtime/highlights", get(ws_highlights))
        .route("/realtime/analytics", get(ws_analytics));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Last layer wraps outermost: request_id runs before request_logging reads it
    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
