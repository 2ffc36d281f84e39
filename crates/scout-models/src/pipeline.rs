//! Pipeline request/response models.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::analysis::AnalysisReport;
use crate::event::{EventType, TimeRange};
use crate::highlight::{Classification, HighlightRecord};

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Resolving,
    Acquiring,
    Analyzing,
    Simulating,
    Synthesizing,
    Persisting,
    Notifying,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Resolving => "resolving",
            PipelineStage::Acquiring => "acquiring",
            PipelineStage::Analyzing => "analyzing",
            PipelineStage::Simulating => "simulating",
            PipelineStage::Synthesizing => "synthesizing",
            PipelineStage::Persisting => "persisting",
            PipelineStage::Notifying => "notifying",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

fn default_true() -> bool {
    true
}

/// Request to run the full pipeline for one video.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessVideoRequest {
    /// Hosted-platform link, direct media URL or asset reference
    #[validate(length(min = 1, max = 2048))]
    pub video_url: String,

    #[validate(length(min = 1, max = 128))]
    pub player_id: String,

    #[validate(length(min = 1, max = 256))]
    pub match_name: String,

    pub match_date: DateTime<Utc>,

    #[serde(default = "default_true")]
    pub auto_create_highlights: bool,
}

/// Request to re-run the query step on an already indexed asset.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReanalyzeRequest {
    #[validate(length(min = 1, max = 128))]
    pub player_id: String,

    #[serde(default)]
    pub event_types: Option<Vec<EventType>>,
}

/// Request to extract and persist highlights from an already indexed asset.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractHighlightsRequest {
    #[validate(length(min = 1, max = 128))]
    pub player_id: String,

    #[validate(length(min = 1, max = 256))]
    pub match_name: String,

    pub match_date: DateTime<Utc>,

    #[serde(default)]
    pub event_types: Option<Vec<EventType>>,

    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub min_confidence: Option<f64>,
}

/// Compact view of a created highlight returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightSummary {
    pub id: String,
    pub title: String,
    pub classification: Classification,
    pub time_range: TimeRange,
    pub video_url: String,
}

impl From<&HighlightRecord> for HighlightSummary {
    fn from(record: &HighlightRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            classification: record.classification,
            time_range: record.time_range,
            video_url: record.video_url.clone(),
        }
    }
}

/// Outcome of `process_video`. `status` is always `"success"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessVideoResponse {
    pub status: String,
    pub asset_id: String,
    pub player_id: String,
    pub player_name: String,
    pub match_name: String,
    pub analysis: AnalysisReport,
    pub highlights_created: usize,
    pub highlights: Vec<HighlightSummary>,
    pub message: String,
}
