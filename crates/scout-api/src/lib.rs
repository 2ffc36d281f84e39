//! Axum HTTP API server.
//!
//! This crate provides:
//! - Video pipeline endpoints (process, reanalyze, extract highlights)
//! - Realtime WebSocket subscriptions per channel and per player
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
