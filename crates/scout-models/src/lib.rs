//! Shared data models for the ScoutPulse video pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Detected events and their time ranges
//! - Highlight records and their classification
//! - Players and analysis reports
//! - Pipeline requests/responses
//! - Realtime notification envelopes

pub mod analysis;
pub mod error;
pub mod event;
pub mod highlight;
pub mod pipeline;
pub mod player;
pub mod utils;
pub mod ws;

// Re-export common types
pub use analysis::{AnalysisReport, AnalysisSource, KeyMoment, PerformanceMetrics};
pub use error::{ModelError, ModelResult};
pub use event::{Event, EventType, TimeRange};
pub use highlight::{AiInsight, Classification, HighlightRecord};
pub use pipeline::{
    ExtractHighlightsRequest, HighlightSummary, PipelineStage, ProcessVideoRequest,
    ProcessVideoResponse, ReanalyzeRequest, RunId,
};
pub use player::{Player, PlayerStats, RecentPerformance};
pub use utils::{
    embed_url, extract_youtube_id, format_duration, is_hosted_platform_url, YoutubeIdError,
    YoutubeIdResult, HOSTED_PLATFORM_DOMAINS,
};
pub use ws::{AnalysisResults, Channel, RealtimeMessage, Scope};
