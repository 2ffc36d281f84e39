//! Video analysis for the ScoutPulse pipeline.
//!
//! Wraps the Twelve Labs video-understanding API behind [`AnalysisService`]
//! and exposes [`AnalysisGateway`], which turns semantic search results into
//! detected events, key moments and aggregate metrics. When no service is
//! configured the gateway can still produce a deterministic simulated report.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod keywords;
pub mod normalize;
pub mod service;
pub mod types;

pub use aggregate::aggregate_metrics;
pub use client::TwelveLabsClient;
pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use fallback::{simulated_asset_id, simulated_report};
pub use gateway::{AnalysisGateway, DEFAULT_MIN_CONFIDENCE, EXTRACT_PAGE_LIMIT};
pub use keywords::{keywords, ALL_CATEGORIES};
pub use service::{AnalysisService, SearchOption, UploadMetadata, UploadSource};
pub use types::{HitClip, SearchHit};
