//! Analysis report models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventType};

/// Where an analysis report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// External video-understanding service
    Live,
    /// Deterministic offline fallback
    Simulated,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisSource::Live => "live",
            AnalysisSource::Simulated => "simulated",
        }
    }
}

/// Aggregate metrics over the retained events, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceMetrics {
    pub success_rate: f64,
    pub intensity: f64,
    pub technical_quality: f64,
}

/// A scored moment surfaced by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeyMoment {
    pub time: u32,
    pub description: String,
    pub importance: f64,
    pub event_type: EventType,
}

/// Result of analyzing one asset for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: String,
    pub asset_id: String,
    pub source: AnalysisSource,
    pub events: Vec<Event>,
    pub key_moments: Vec<KeyMoment>,
    pub metrics: PerformanceMetrics,
    pub summary: String,
}

impl AnalysisReport {
    pub fn total_events(&self) -> usize {
        self.events.len()
    }

    pub fn is_simulated(&self) -> bool {
        self.source == AnalysisSource::Simulated
    }
}
