//! End-to-end pipeline runs over fake collaborators.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tokio::sync::mpsc;

use scout_analysis::{
    AnalysisError, AnalysisGateway, AnalysisResult, AnalysisService, HitClip, SearchHit,
    SearchOption, UploadMetadata, UploadSource,
};
use scout_media::{AcquireConfig, Downloader, MediaAcquirer, MediaError, MediaResult, Transcoder};
use scout_models::{
    AnalysisSource, Channel, Classification, EventType, ExtractHighlightsRequest,
    HighlightRecord, ProcessVideoRequest, Scope,
};
use scout_pipeline::{PipelineConfig, PipelineCoordinator, PipelineError};
use scout_realtime::{NotificationHub, RealtimeNotifier, OUTBOUND_QUEUE_SIZE};
use scout_store::{HighlightStore, InMemoryStore, StoreError, StoreResult, TEST_PLAYER_ID};

const HOSTED_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

// ----------------------------------------------------------------------------
// Fakes
// ----------------------------------------------------------------------------

#[derive(Default)]
struct FakeDownloader {
    fail: bool,
    dirs: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, _url: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
        self.dirs.lock().unwrap().push(dest_dir.to_path_buf());
        if self.fail {
            return Err(MediaError::download_failed("video unavailable"));
        }
        let path = dest_dir.join("source.mp4");
        tokio::fs::write(&path, b"raw").await?;
        Ok(path)
    }
}

struct FakeTranscoder;

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn run(&self, input: &Path, _max_duration_secs: u32) -> MediaResult<PathBuf> {
        let output = input.with_file_name("normalized.mp4");
        tokio::fs::write(&output, b"normalized").await?;
        Ok(output)
    }
}

#[derive(Default)]
struct FakeService {
    fail_query: bool,
    goal_hits: Vec<SearchHit>,
    uploads: Mutex<Vec<UploadSource>>,
}

fn hit(score: f64, start: f64, end: f64) -> SearchHit {
    SearchHit {
        score,
        video_id: Some("asset-1".to_string()),
        clips: vec![HitClip {
            start,
            end,
            clip_id: None,
            thumbnail_url: None,
        }],
    }
}

#[async_trait]
impl AnalysisService for FakeService {
    async fn upload(&self, source: UploadSource, _metadata: &UploadMetadata) -> AnalysisResult<String> {
        self.uploads.lock().unwrap().push(source);
        Ok("asset-1".to_string())
    }

    async fn query(
        &self,
        _asset_id: &str,
        text: &str,
        _options: &[SearchOption],
        _limit: u32,
    ) -> AnalysisResult<Vec<SearchHit>> {
        if self.fail_query {
            return Err(AnalysisError::ServiceUnavailable("search down".to_string()));
        }
        Ok(match text {
            "Test Player goal" | "goal" => self.goal_hits.clone(),
            _ => vec![],
        })
    }

    async fn summarize(&self, _asset_id: &str, _prompt: &str) -> AnalysisResult<String> {
        Ok("Strong performance".to_string())
    }

    fn asset_url(&self, asset_id: &str) -> Option<String> {
        Some(format!("https://api.test/v1.3/indexes/idx-1/videos/{}", asset_id))
    }
}

/// Rejects assists, stores everything else.
struct FlakyStore {
    inner: Arc<InMemoryStore>,
}

#[async_trait]
impl HighlightStore for FlakyStore {
    async fn create(&self, record: HighlightRecord) -> StoreResult<HighlightRecord> {
        if record.title.ends_with("Assist") {
            return Err(StoreError::Unavailable("write timeout".to_string()));
        }
        self.inner.create(record).await
    }

    async fn by_player(&self, player_id: &str) -> StoreResult<Vec<HighlightRecord>> {
        self.inner.by_player(player_id).await
    }
}

// ----------------------------------------------------------------------------
// Harness
// ----------------------------------------------------------------------------

struct Harness {
    coordinator: PipelineCoordinator,
    store: Arc<InMemoryStore>,
    hub: Arc<NotificationHub>,
    work_dir: TempDir,
    downloader: Arc<FakeDownloader>,
}

struct HarnessBuilder {
    service: Option<FakeService>,
    downloader: FakeDownloader,
    flaky_store: bool,
    config: PipelineConfig,
}

impl HarnessBuilder {
    fn new() -> Self {
        Self {
            service: None,
            downloader: FakeDownloader::default(),
            flaky_store: false,
            config: PipelineConfig::default(),
        }
    }

    fn service(mut self, service: FakeService) -> Self {
        self.service = Some(service);
        self
    }

    fn failing_download(mut self) -> Self {
        self.downloader.fail = true;
        self
    }

    fn flaky_store(mut self) -> Self {
        self.flaky_store = true;
        self
    }

    fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    async fn build(self) -> Harness {
        let store = Arc::new(InMemoryStore::new());
        store.seed_test_player().await;
        let highlights: Arc<dyn HighlightStore> = if self.flaky_store {
            Arc::new(FlakyStore { inner: store.clone() })
        } else {
            store.clone()
        };

        let work_dir = TempDir::new().unwrap();
        let downloader = Arc::new(self.downloader);
        let acquirer = MediaAcquirer::new(
            AcquireConfig {
                work_dir: Some(work_dir.path().to_path_buf()),
                ..AcquireConfig::default()
            },
            downloader.clone(),
            Arc::new(FakeTranscoder),
        );

        let gateway = match self.service {
            Some(service) => {
                let service: Arc<dyn AnalysisService> = Arc::new(service);
                AnalysisGateway::new(Some(service), 5)
            }
            None => AnalysisGateway::unconfigured(),
        };

        let hub = Arc::new(NotificationHub::new());
        let coordinator = PipelineCoordinator::new(
            store.clone(),
            highlights,
            acquirer,
            gateway,
            RealtimeNotifier::new(hub.clone()),
            self.config,
        );

        Harness {
            coordinator,
            store,
            hub,
            work_dir,
            downloader,
        }
    }
}

impl Harness {
    fn leftover_entries(&self) -> usize {
        std::fs::read_dir(self.work_dir.path()).unwrap().count()
    }

    async fn subscribe(&self, scope: Scope) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        let id = self.hub.register(tx).await;
        self.hub.subscribe(id, scope).await.unwrap();
        rx
    }
}

fn request(video_url: &str) -> ProcessVideoRequest {
    ProcessVideoRequest {
        video_url: video_url.to_string(),
        player_id: TEST_PLAYER_ID.to_string(),
        match_name: "Test FC vs Rivals".to_string(),
        match_date: Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap(),
        auto_create_highlights: true,
    }
}

fn drain_types(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
    let mut types = Vec::new();
    while let Ok(raw) = rx.try_recv() {
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        types.push(value["type"].as_str().unwrap().to_string());
    }
    types
}

// ----------------------------------------------------------------------------
// process_video
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_unconfigured_service_returns_simulated_highlights() {
    let harness = HarnessBuilder::new().build().await;
    let mut player_rx = harness.subscribe(Scope::player(TEST_PLAYER_ID)).await;
    let mut analytics_rx = harness.subscribe(Channel::Analytics.into()).await;

    let response = harness
        .coordinator
        .process_video(&request(HOSTED_URL))
        .await
        .unwrap();

    assert_eq!(response.status, "success");
    assert_eq!(response.player_name, "Test Player");
    assert_eq!(response.analysis.source, AnalysisSource::Simulated);
    assert_eq!(
        response.message,
        "Twelve Labs unavailable. Returned simulated analysis and highlights for local testing."
    );
    assert_eq!(response.highlights_created, 3);
    assert_eq!(response.highlights[0].title, "Test Player - Goal");
    assert_eq!(response.highlights[0].classification, Classification::Strength);

    let stored = harness.store.by_player(TEST_PLAYER_ID).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].duration, "0:15");
    assert_eq!(stored[0].video_url, "https://www.youtube.com/embed/dQw4w9WgXcQ");
    assert_eq!(stored[2].title, "Test Player - Dribbling Sequence");

    // Nothing is downloaded when the analyzer cannot take it
    assert!(harness.downloader.dirs.lock().unwrap().is_empty());

    assert_eq!(
        drain_types(&mut player_rx),
        vec!["highlight_added", "highlight_added", "highlight_added", "analysis_complete"]
    );
    assert_eq!(drain_types(&mut analytics_rx), vec!["analysis_complete", "stats_update"]);
}

#[tokio::test]
async fn test_unknown_player_fails_before_any_work() {
    let harness = HarnessBuilder::new().service(FakeService::default()).build().await;
    let mut req = request(HOSTED_URL);
    req.player_id = "nobody".to_string();

    let err = harness.coordinator.process_video(&req).await.unwrap_err();
    assert!(matches!(err, PipelineError::PlayerNotFound(id) if id == "nobody"));
    assert!(harness.downloader.dirs.lock().unwrap().is_empty());
    assert_eq!(harness.store.highlight_count().await, 0);
}

#[tokio::test]
async fn test_live_run_uploads_local_file_and_cleans_up() {
    let service = FakeService {
        goal_hits: vec![hit(92.0, 75.0, 90.0)],
        ..FakeService::default()
    };
    let harness = HarnessBuilder::new()
        .service(service)
        .config(PipelineConfig {
            event_types: vec![EventType::Goal],
            ..PipelineConfig::default()
        })
        .build()
        .await;

    let response = harness
        .coordinator
        .process_video(&request(HOSTED_URL))
        .await
        .unwrap();

    assert_eq!(response.analysis.source, AnalysisSource::Live);
    assert_eq!(response.asset_id, "asset-1");
    assert_eq!(response.message, "Successfully processed video. Created 1 highlights.");
    assert_eq!(response.analysis.summary, "Strong performance");

    let workspace = harness.downloader.dirs.lock().unwrap()[0].clone();
    assert!(!workspace.exists());
    assert_eq!(harness.leftover_entries(), 0);
}

#[tokio::test]
async fn test_direct_url_is_passed_through() {
    let service = Arc::new(FakeService::default());
    let store = Arc::new(InMemoryStore::new());
    store.seed_test_player().await;
    let downloader = Arc::new(FakeDownloader::default());
    let coordinator = PipelineCoordinator::new(
        store.clone(),
        store.clone(),
        MediaAcquirer::new(AcquireConfig::default(), downloader.clone(), Arc::new(FakeTranscoder)),
        AnalysisGateway::new(Some(service.clone()), 5),
        RealtimeNotifier::new(Arc::new(NotificationHub::new())),
        PipelineConfig::default(),
    );

    let response = coordinator
        .process_video(&request("https://cdn.example.com/match.mp4"))
        .await
        .unwrap();

    assert_eq!(response.analysis.source, AnalysisSource::Live);
    assert_eq!(response.highlights_created, 0);
    assert!(downloader.dirs.lock().unwrap().is_empty());
    assert_eq!(
        *service.uploads.lock().unwrap(),
        vec![UploadSource::Url("https://cdn.example.com/match.mp4".to_string())]
    );
}

#[tokio::test]
async fn test_download_failure_falls_back_without_leftovers() {
    let harness = HarnessBuilder::new()
        .service(FakeService::default())
        .failing_download()
        .build()
        .await;

    let response = harness
        .coordinator
        .process_video(&request(HOSTED_URL))
        .await
        .unwrap();

    assert_eq!(response.status, "success");
    assert_eq!(response.analysis.source, AnalysisSource::Simulated);
    assert_eq!(response.highlights_created, 3);
    assert_eq!(harness.downloader.dirs.lock().unwrap().len(), 1);
    assert_eq!(harness.leftover_entries(), 0);
}

#[tokio::test]
async fn test_analysis_failure_falls_back_without_leftovers() {
    let service = FakeService {
        fail_query: true,
        ..FakeService::default()
    };
    let harness = HarnessBuilder::new().service(service).build().await;

    let response = harness
        .coordinator
        .process_video(&request(HOSTED_URL))
        .await
        .unwrap();

    assert_eq!(response.analysis.source, AnalysisSource::Simulated);
    assert_eq!(response.analysis.events.len(), 3);
    assert_eq!(harness.leftover_entries(), 0);
}

#[tokio::test]
async fn test_highlights_capped_at_twenty_by_confidence() {
    // 25 detections scoring 71..=95
    let goal_hits = (0..25)
        .map(|i| hit(71.0 + i as f64, i as f64 * 30.0, i as f64 * 30.0 + 10.0))
        .collect();
    let service = FakeService {
        goal_hits,
        ..FakeService::default()
    };
    let harness = HarnessBuilder::new()
        .service(service)
        .config(PipelineConfig {
            event_types: vec![EventType::Goal],
            ..PipelineConfig::default()
        })
        .build()
        .await;

    let response = harness
        .coordinator
        .process_video(&request("https://cdn.example.com/match.mp4"))
        .await
        .unwrap();

    assert_eq!(response.analysis.total_events(), 25);
    assert_eq!(response.highlights_created, 20);

    let stored = harness.store.by_player(TEST_PLAYER_ID).await.unwrap();
    assert_eq!(stored.len(), 20);
    assert_eq!(stored[0].ai_insights.confidence, 95);
    assert!(stored.iter().all(|h| h.ai_insights.confidence >= 76));
}

#[tokio::test]
async fn test_persistence_failures_are_skipped() {
    let harness = HarnessBuilder::new().flaky_store().build().await;

    let response = harness
        .coordinator
        .process_video(&request(HOSTED_URL))
        .await
        .unwrap();

    assert_eq!(response.status, "success");
    assert_eq!(response.highlights_created, 2);
    let titles: Vec<&str> = response.highlights.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["Test Player - Goal", "Test Player - Dribbling Sequence"]);
}

#[tokio::test]
async fn test_auto_create_disabled() {
    let harness = HarnessBuilder::new().build().await;
    let mut req = request(HOSTED_URL);
    req.auto_create_highlights = false;

    let response = harness.coordinator.process_video(&req).await.unwrap();
    assert_eq!(response.highlights_created, 0);
    assert_eq!(response.analysis.events.len(), 3);
    assert_eq!(harness.store.highlight_count().await, 0);
}

#[tokio::test]
async fn test_small_cap_keeps_strongest() {
    let harness = HarnessBuilder::new()
        .config(PipelineConfig::default().with_highlight_cap(1))
        .build()
        .await;

    let response = harness
        .coordinator
        .process_video(&request(HOSTED_URL))
        .await
        .unwrap();
    assert_eq!(response.highlights_created, 1);
    assert_eq!(response.highlights[0].title, "Test Player - Goal");
}

// ----------------------------------------------------------------------------
// reanalyze / extract_and_save
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_reanalyze_requires_service() {
    let harness = HarnessBuilder::new().build().await;
    let err = harness
        .coordinator
        .reanalyze("asset-1", TEST_PLAYER_ID, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::AnalysisUnavailable));
}

#[tokio::test]
async fn test_reanalyze_returns_report_without_persisting() {
    let service = FakeService {
        goal_hits: vec![hit(88.0, 10.0, 20.0)],
        ..FakeService::default()
    };
    let harness = HarnessBuilder::new().service(service).build().await;

    let report = harness
        .coordinator
        .reanalyze("asset-1", TEST_PLAYER_ID, Some(&[EventType::Goal]))
        .await
        .unwrap();

    assert_eq!(report.source, AnalysisSource::Live);
    assert_eq!(report.events.len(), 1);
    assert_eq!(harness.store.highlight_count().await, 0);
}

#[tokio::test]
async fn test_extract_and_save_uses_asset_url() {
    let service = FakeService {
        goal_hits: vec![hit(85.0, 30.0, 42.0), hit(50.0, 60.0, 65.0)],
        ..FakeService::default()
    };
    let harness = HarnessBuilder::new().service(service).build().await;
    let mut highlights_rx = harness.subscribe(Channel::Highlights.into()).await;

    let request = ExtractHighlightsRequest {
        player_id: TEST_PLAYER_ID.to_string(),
        match_name: "Cup Final".to_string(),
        match_date: Utc::now(),
        event_types: Some(vec![EventType::Goal]),
        min_confidence: None,
    };
    let created = harness
        .coordinator
        .extract_and_save("asset-1", &request)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].video_url,
        "https://api.test/v1.3/indexes/idx-1/videos/asset-1"
    );
    assert_eq!(created[0].duration, "0:12");
    assert_eq!(created[0].match_name, "Cup Final");
    assert_eq!(drain_types(&mut highlights_rx), vec!["highlight_added"]);
}
