//! Highlight record models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::event::TimeRange;

/// Strength/weakness/neutral label assigned to a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Strength,
    Weakness,
    Neutral,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Strength => "strength",
            Classification::Weakness => "weakness",
            Classification::Neutral => "neutral",
        }
    }
}

/// AI-derived insight attached to a highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AiInsight {
    /// Confidence as a whole percentage (0-100)
    pub confidence: u8,
    /// One-line analysis sentence
    pub analysis: String,
    /// Key moments in the clip
    pub key_moments: Vec<String>,
}

/// A classified clip reference derived from one detected event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRecord {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub video_url: String,
    /// `M:SS`, always equal to `time_range.end - time_range.start`
    pub duration: String,
    pub match_name: String,
    pub match_date: DateTime<Utc>,
    pub classification: Classification,
    pub tags: Vec<String>,
    pub player_id: String,
    pub description: String,
    pub time_range: TimeRange,
    pub ai_insights: AiInsight,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
