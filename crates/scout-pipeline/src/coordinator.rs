//! Pipeline orchestration.
//!
//! One run is a strictly sequential chain of awaited steps:
//! resolve, acquire, upload/analyze, synthesize, persist, notify. Any
//! acquisition or analysis failure switches the run to the simulated report
//! and rejoins at synthesis, so past the player lookup a run always succeeds.

use std::sync::Arc;
use std::time::Instant;

use tracing::{warn, Instrument};

use scout_analysis::{AnalysisGateway, UploadMetadata, UploadSource, DEFAULT_MIN_CONFIDENCE};
use scout_media::{AcquiredMedia, MediaAcquirer};
use scout_models::{
    AnalysisReport, AnalysisResults, Classification, Event, EventType, ExtractHighlightsRequest,
    HighlightRecord, HighlightSummary, PipelineStage, Player, ProcessVideoRequest,
    ProcessVideoResponse, RunId,
};
use scout_realtime::RealtimeNotifier;
use scout_store::{HighlightStore, PlayerLookup};

use crate::config::PipelineConfig;
use crate::error::{LiveFailure, PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::metrics;
use crate::synthesizer::{synthesize, MatchContext, PlayerContext};

const SIMULATED_MESSAGE: &str =
    "Twelve Labs unavailable. Returned simulated analysis and highlights for local testing.";

/// Highest-confidence events first, at most `cap` of them.
///
/// Ties keep detection order.
pub fn select_top_events(events: &[Event], cap: usize) -> Vec<&Event> {
    let mut ranked: Vec<&Event> = events.iter().collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(cap);
    ranked
}

/// Sequences media acquisition, analysis, synthesis, persistence and notification.
#[derive(Clone)]
pub struct PipelineCoordinator {
    players: Arc<dyn PlayerLookup>,
    highlights: Arc<dyn HighlightStore>,
    acquirer: MediaAcquirer,
    gateway: AnalysisGateway,
    notifier: RealtimeNotifier,
    config: PipelineConfig,
}

impl PipelineCoordinator {
    pub fn new(
        players: Arc<dyn PlayerLookup>,
        highlights: Arc<dyn HighlightStore>,
        acquirer: MediaAcquirer,
        gateway: AnalysisGateway,
        notifier: RealtimeNotifier,
        config: PipelineConfig,
    ) -> Self {
        Self {
            players,
            highlights,
            acquirer,
            gateway,
            notifier,
            config,
        }
    }

    pub fn gateway(&self) -> &AnalysisGateway {
        &self.gateway
    }

    pub fn notifier(&self) -> &RealtimeNotifier {
        &self.notifier
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    async fn player(&self, player_id: &str) -> PipelineResult<Player> {
        self.players
            .by_id(player_id)
            .await?
            .ok_or_else(|| PipelineError::player_not_found(player_id))
    }

    /// Run the full pipeline for one video.
    ///
    /// Only `PlayerNotFound` and player lookup failures are returned as errors.
    pub async fn process_video(&self, request: &ProcessVideoRequest) -> PipelineResult<ProcessVideoResponse> {
        let logger = RunLogger::new(&RunId::new(), "process_video");
        let span = logger.create_span();
        self.process_video_inner(request, &logger).instrument(span).await
    }

    async fn process_video_inner(
        &self,
        request: &ProcessVideoRequest,
        logger: &RunLogger,
    ) -> PipelineResult<ProcessVideoResponse> {
        let started = Instant::now();
        let player = match self.player(&request.player_id).await {
            Ok(player) => player,
            Err(e) => {
                logger.log_stage(PipelineStage::Failed);
                logger.log_error(&e.to_string());
                return Err(e);
            }
        };
        logger.log_start(&format!(
            "player={} video={} match={}",
            player.id, request.video_url, request.match_name
        ));

        logger.log_stage(PipelineStage::Resolving);
        let report = match self.run_live(request, &player, logger).await {
            Ok(report) => report,
            Err(failure) => {
                logger.log_warning(&format!("Live analysis unavailable, simulating: {}", failure));
                logger.log_stage(PipelineStage::Simulating);
                metrics::record_fallback(failure.kind());
                self.gateway.simulate(&player.name)
            }
        };

        let created = if request.auto_create_highlights {
            let match_ctx = MatchContext {
                match_name: &request.match_name,
                match_date: request.match_date,
                video_ref: &request.video_url,
            };
            self.create_highlights(&report.events, &player, match_ctx, logger).await
        } else {
            logger.log_progress("Highlight creation disabled for this run");
            Vec::new()
        };

        logger.log_stage(PipelineStage::Notifying);
        self.notify_run(&report, &player.id, &created).await;

        let message = if report.is_simulated() {
            SIMULATED_MESSAGE.to_string()
        } else {
            format!("Successfully processed video. Created {} highlights.", created.len())
        };

        metrics::record_run(report.source, started.elapsed().as_secs_f64());
        logger.log_stage(PipelineStage::Done);
        logger.log_completion(&format!(
            "source={} events={} highlights={}",
            report.source.as_str(),
            report.total_events(),
            created.len()
        ));

        Ok(ProcessVideoResponse {
            status: "success".to_string(),
            asset_id: report.asset_id.clone(),
            player_id: player.id,
            player_name: player.name,
            match_name: request.match_name.clone(),
            highlights_created: created.len(),
            highlights: created.iter().map(HighlightSummary::from).collect(),
            analysis: report,
            message,
        })
    }

    /// Acquire, upload and analyze. Acquired media is released on every path.
    async fn run_live(
        &self,
        request: &ProcessVideoRequest,
        player: &Player,
        logger: &RunLogger,
    ) -> Result<AnalysisReport, LiveFailure> {
        if !self.gateway.is_configured() {
            return Err(LiveFailure::Unconfigured);
        }

        logger.log_stage(PipelineStage::Acquiring);
        let media = self.acquirer.acquire(&request.video_url).await?;

        logger.log_stage(PipelineStage::Analyzing);
        let outcome = self.analyze_media(&media, request, player).await;

        if let Err(e) = media.release() {
            logger.log_warning(&format!("Failed to remove media workspace: {}", e));
        }
        outcome
    }

    async fn analyze_media(
        &self,
        media: &AcquiredMedia,
        request: &ProcessVideoRequest,
        player: &Player,
    ) -> Result<AnalysisReport, LiveFailure> {
        let source = match media {
            AcquiredMedia::Local(local) => UploadSource::File(local.path().to_path_buf()),
            AcquiredMedia::Passthrough(url) => UploadSource::Url(url.clone()),
        };
        let metadata = UploadMetadata::new(
            player.id.clone(),
            &player.name,
            request.match_name.clone(),
            request.match_date,
        );

        let asset_id = self.gateway.upload(source, &metadata).await?;
        let report = self
            .gateway
            .analyze(&asset_id, &player.name, &self.config.event_types)
            .await?;
        Ok(report)
    }

    /// Synthesize and persist the top events; persistence failures are skipped.
    async fn create_highlights(
        &self,
        events: &[Event],
        player: &Player,
        match_ctx: MatchContext<'_>,
        logger: &RunLogger,
    ) -> Vec<HighlightRecord> {
        let selected = select_top_events(events, self.config.highlight_cap);
        if selected.len() < events.len() {
            logger.log_progress(&format!(
                "Keeping {} of {} events",
                selected.len(),
                events.len()
            ));
        }

        logger.log_stage(PipelineStage::Synthesizing);
        let player_ctx = PlayerContext {
            player_id: &player.id,
            player_name: &player.name,
        };
        let records: Vec<HighlightRecord> = selected
            .into_iter()
            .map(|event| synthesize(event, player_ctx, match_ctx))
            .collect();

        logger.log_stage(PipelineStage::Persisting);
        let mut created = Vec::with_capacity(records.len());
        let mut failed = 0;
        for record in records {
            let title = record.title.clone();
            match self.highlights.create(record).await {
                Ok(stored) => created.push(stored),
                Err(e) => {
                    failed += 1;
                    logger.log_warning(&format!("Failed to persist highlight '{}': {}", title, e));
                }
            }
        }
        metrics::record_highlights(created.len(), failed);
        created
    }

    async fn notify_run(&self, report: &AnalysisReport, player_id: &str, created: &[HighlightRecord]) {
        for record in created {
            self.notifier.highlight_added(record).await;
        }

        let results = AnalysisResults {
            asset_id: report.asset_id.clone(),
            source: report.source,
            total_events: report.total_events(),
            highlights_created: created.len(),
            metrics: report.metrics,
        };
        self.notifier
            .analysis_complete(&report.analysis_id, player_id, results)
            .await;

        match self.highlights.by_player(player_id).await {
            Ok(all) => {
                self.notifier.stats_update(highlight_stats(player_id, &all)).await;
            }
            Err(e) => {
                warn!(player_id = %player_id, "Skipping stats update: {}", e);
            }
        }
    }

    /// Re-run the query step against an already indexed asset.
    ///
    /// Nothing is persisted.
    pub async fn reanalyze(
        &self,
        asset_id: &str,
        player_id: &str,
        event_types: Option<&[EventType]>,
    ) -> PipelineResult<AnalysisReport> {
        if !self.gateway.is_configured() {
            return Err(PipelineError::AnalysisUnavailable);
        }
        let logger = RunLogger::new(&RunId::new(), "reanalyze");
        let player = self.player(player_id).await?;
        logger.log_start(&format!("asset={} player={}", asset_id, player.id));

        logger.log_stage(PipelineStage::Analyzing);
        let report = self
            .gateway
            .analyze(asset_id, &player.name, event_types.unwrap_or(&[]))
            .instrument(logger.create_span())
            .await?;

        logger.log_completion(&format!("events={}", report.total_events()));
        Ok(report)
    }

    /// Extract highlight candidates from an indexed asset and persist them.
    pub async fn extract_and_save(
        &self,
        asset_id: &str,
        request: &ExtractHighlightsRequest,
    ) -> PipelineResult<Vec<HighlightRecord>> {
        if !self.gateway.is_configured() {
            return Err(PipelineError::AnalysisUnavailable);
        }
        let logger = RunLogger::new(&RunId::new(), "extract_highlights");
        let player = self.player(&request.player_id).await?;
        logger.log_start(&format!("asset={} player={}", asset_id, player.id));

        logger.log_stage(PipelineStage::Analyzing);
        let event_types = request.event_types.as_deref().unwrap_or(&[]);
        let min_confidence = request.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE);
        let events = self
            .gateway
            .extract_highlights(asset_id, event_types, min_confidence)
            .await?;

        let video_ref = self
            .gateway
            .asset_url(asset_id)
            .unwrap_or_else(|| asset_id.to_string());
        let match_ctx = MatchContext {
            match_name: &request.match_name,
            match_date: request.match_date,
            video_ref: &video_ref,
        };
        let created = self
            .create_highlights(&events, &player, match_ctx, &logger)
            .await;

        logger.log_stage(PipelineStage::Notifying);
        for record in &created {
            self.notifier.highlight_added(record).await;
        }

        logger.log_stage(PipelineStage::Done);
        logger.log_completion(&format!("events={} highlights={}", events.len(), created.len()));
        Ok(created)
    }
}

/// Aggregate highlight counts for the analytics channel.
fn highlight_stats(player_id: &str, highlights: &[HighlightRecord]) -> serde_json::Value {
    let count = |c: Classification| highlights.iter().filter(|h| h.classification == c).count();
    serde_json::json!({
        "player_id": player_id,
        "total_highlights": highlights.len(),
        "strengths": count(Classification::Strength),
        "weaknesses": count(Classification::Weakness),
        "neutral": count(Classification::Neutral),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_models::TimeRange;

    fn event(confidence: f64) -> Event {
        Event::new(
            EventType::Shot,
            TimeRange::new(0, 5).unwrap(),
            confidence,
            "shot",
            "a",
        )
    }

    #[test]
    fn test_select_top_events_caps_by_confidence() {
        let events: Vec<Event> = (0..25).map(|i| event(0.5 + i as f64 / 100.0)).collect();
        let selected = select_top_events(&events, 20);
        assert_eq!(selected.len(), 20);
        assert!((selected[0].confidence - 0.74).abs() < 1e-9);
        assert!(selected.iter().all(|e| e.confidence > 0.545));
    }

    #[test]
    fn test_select_top_events_keeps_order_on_ties() {
        let mut events = vec![event(0.8), event(0.8)];
        events[1].description = "second".to_string();
        let selected = select_top_events(&events, 1);
        assert_eq!(selected[0].description, "shot");
    }

    #[test]
    fn test_highlight_stats() {
        let stats = highlight_stats("p1", &[]);
        assert_eq!(stats["total_highlights"], 0);
        assert_eq!(stats["player_id"], "p1");
    }
}
