//! High-level analysis operations over an optional [`AnalysisService`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use scout_models::{AnalysisReport, AnalysisSource, Event, EventType, TimeRange};

use crate::aggregate::aggregate_metrics;
use crate::client::TwelveLabsClient;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::fallback::simulated_report;
use crate::keywords::{analysis_queries, keywords, ALL_CATEGORIES};
use crate::normalize::Detections;
use crate::service::{AnalysisService, SearchOption, UploadMetadata, UploadSource};

/// Page limit used when extracting highlights from an indexed asset.
pub const EXTRACT_PAGE_LIMIT: u32 = 3;

/// Minimum confidence for extracted highlights unless the caller overrides it.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

const SEARCH_OPTIONS: &[SearchOption] = &[SearchOption::Visual];

fn summary_prompt(player_name: &str) -> String {
    format!(
        "Provide a detailed analysis of {}'s performance in this match. \
         Focus on: technical skills, tactical awareness, strengths, and areas for improvement.",
        player_name
    )
}

fn summary_fallback(player_name: &str) -> String {
    format!("Analysis of {}'s performance in the match.", player_name)
}

/// Entry point the pipeline uses for all analysis work.
#[derive(Clone)]
pub struct AnalysisGateway {
    service: Option<Arc<dyn AnalysisService>>,
    page_limit: u32,
}

impl AnalysisGateway {
    pub fn new(service: Option<Arc<dyn AnalysisService>>, page_limit: u32) -> Self {
        Self { service, page_limit }
    }

    /// Gateway without a live service; every live call fails with `Unconfigured`.
    pub fn unconfigured() -> Self {
        Self::new(None, AnalysisConfig::default().page_limit)
    }

    /// Build the Twelve Labs backed gateway, or an unconfigured one without an API key.
    pub fn from_config(config: AnalysisConfig) -> AnalysisResult<Self> {
        let page_limit = config.page_limit;
        if !config.is_configured() {
            warn!("TWELVE_LABS_API_KEY not set; analysis runs in simulated mode");
            return Ok(Self::new(None, page_limit));
        }
        let client = TwelveLabsClient::new(config)?;
        Ok(Self::new(Some(Arc::new(client)), page_limit))
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    fn service(&self) -> AnalysisResult<&Arc<dyn AnalysisService>> {
        self.service.as_ref().ok_or(AnalysisError::Unconfigured)
    }

    /// Index media and return the service asset id.
    pub async fn upload(&self, source: UploadSource, metadata: &UploadMetadata) -> AnalysisResult<String> {
        self.service()?.upload(source, metadata).await
    }

    /// Query every requested category for the player and build a live report.
    ///
    /// An empty `event_types` means every category in the keyword table.
    pub async fn analyze(
        &self,
        asset_id: &str,
        player_name: &str,
        event_types: &[EventType],
    ) -> AnalysisResult<AnalysisReport> {
        let service = self.service()?;
        let categories: &[EventType] = if event_types.is_empty() {
            &ALL_CATEGORIES
        } else {
            event_types
        };

        let mut detections = Detections::new();
        for &event_type in categories {
            for (keyword, query) in analysis_queries(event_type, player_name) {
                let hits = service
                    .query(asset_id, &query, SEARCH_OPTIONS, self.page_limit)
                    .await?;
                detections.absorb(&hits, event_type, keyword, player_name, asset_id);
            }
        }

        let metrics = aggregate_metrics(&detections.events);
        let key_moments = detections.top_key_moments();
        let summary = self.summarize(asset_id, player_name).await;

        info!(
            asset_id = %asset_id,
            events = detections.events.len(),
            categories = categories.len(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            analysis_id: format!("twelvelabs_{}_{}", asset_id, Utc::now().timestamp()),
            asset_id: asset_id.to_string(),
            source: AnalysisSource::Live,
            events: detections.events,
            key_moments,
            metrics,
            summary,
        })
    }

    /// Performance summary; failures degrade to a generic sentence.
    pub async fn summarize(&self, asset_id: &str, player_name: &str) -> String {
        let Ok(service) = self.service() else {
            return summary_fallback(player_name);
        };
        match service.summarize(asset_id, &summary_prompt(player_name)).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(asset_id = %asset_id, "Summary generation failed: {}", e);
                summary_fallback(player_name)
            }
        }
    }

    /// Highlight candidates from an already indexed asset.
    ///
    /// One query per category using its primary keyword; hits at or above
    /// `min_confidence` contribute one event per clip.
    pub async fn extract_highlights(
        &self,
        asset_id: &str,
        event_types: &[EventType],
        min_confidence: f64,
    ) -> AnalysisResult<Vec<Event>> {
        let service = self.service()?;
        let categories: &[EventType] = if event_types.is_empty() {
            &ALL_CATEGORIES
        } else {
            event_types
        };

        let mut events = Vec::new();
        for &event_type in categories {
            let Some(keyword) = keywords(event_type).first() else {
                continue;
            };
            let hits = service
                .query(asset_id, keyword, SEARCH_OPTIONS, EXTRACT_PAGE_LIMIT)
                .await?;
            for hit in hits.iter().filter(|h| h.confidence() >= min_confidence) {
                let video_id = hit.video_id.as_deref().unwrap_or(asset_id);
                for clip in &hit.clips {
                    let mut event = Event::new(
                        event_type,
                        TimeRange::from_secs_f64(clip.start, clip.end),
                        hit.confidence(),
                        *keyword,
                        video_id,
                    );
                    if let Some(clip_id) = &clip.clip_id {
                        event = event.with_clip_id(clip_id.clone());
                    }
                    events.push(event);
                }
            }
        }
        Ok(events)
    }

    /// Deterministic stand-in report.
    pub fn simulate(&self, player_name: &str) -> AnalysisReport {
        simulated_report(player_name)
    }

    /// Service URL for an indexed asset.
    pub fn asset_url(&self, asset_id: &str) -> Option<String> {
        self.service.as_ref().and_then(|s| s.asset_url(asset_id))
    }
}
