//! Twelve Labs HTTP client.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::service::{AnalysisService, SearchOption, UploadMetadata, UploadSource};
use crate::types::{
    CreateIndexRequest, CreatedResource, IndexList, SearchHit, SearchResponse, SummarizeRequest,
    SummarizeResponse, TaskInfo,
};

const API_KEY_HEADER: &str = "x-api-key";

const RETRY_BASE_DELAY_MS: u64 = 500;
const RETRY_MAX_DELAY_MS: u64 = 10_000;

/// Exponential backoff from [`RETRY_BASE_DELAY_MS`], capped at [`RETRY_MAX_DELAY_MS`].
fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(RETRY_BASE_DELAY_MS.saturating_mul(factor).min(RETRY_MAX_DELAY_MS))
}

/// Client for the Twelve Labs REST API.
pub struct TwelveLabsClient {
    http: Client,
    config: AnalysisConfig,
    api_key: String,
    /// Resolved once per process
    index_id: OnceCell<String>,
}

impl TwelveLabsClient {
    /// Create a client; fails with `Unconfigured` when no API key is set.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        let api_key = config.api_key.clone().ok_or(AnalysisError::Unconfigured)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AnalysisError::Network)?;

        Ok(Self {
            http,
            config,
            api_key,
            index_id: OnceCell::new(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> AnalysisResult<Self> {
        Self::new(AnalysisConfig::from_env())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> AnalysisResult<Response> {
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout(self.config.timeout.as_secs())
            } else {
                AnalysisError::Network(e)
            }
        })
    }

    async fn parse<T: DeserializeOwned>(path: &str, response: Response) -> AnalysisResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::from_http_status(
                status.as_u16(),
                format!("{} failed: {}", path, body),
            ));
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AnalysisError::invalid_response(format!("{}: {}", path, e)))
    }

    /// Resolve the index to upload into, creating it if needed.
    pub async fn ensure_index(&self) -> AnalysisResult<String> {
        self.index_id
            .get_or_try_init(|| self.resolve_index())
            .await
            .cloned()
    }

    async fn resolve_index(&self) -> AnalysisResult<String> {
        if let Some(id) = &self.config.index_id {
            match self.verify_index(id).await {
                Ok(()) => return Ok(id.clone()),
                Err(e) => warn!(index_id = %id, "Configured index not usable, falling back to lookup: {}", e),
            }
        }

        let name = &self.config.index_name;
        if let Some(id) = self.find_index(name).await? {
            info!(index_id = %id, index_name = %name, "Using existing index");
            return Ok(id);
        }
        self.create_index(name).await
    }

    async fn verify_index(&self, index_id: &str) -> AnalysisResult<()> {
        let path = format!("/indexes/{}", index_id);
        let response = self.send_with_retry(|| self.request(Method::GET, &path)).await?;
        let _: serde_json::Value = Self::parse(&path, response).await?;
        Ok(())
    }

    async fn find_index(&self, name: &str) -> AnalysisResult<Option<String>> {
        let path = "/indexes";
        let response = self
            .send_with_retry(|| self.request(Method::GET, path).query(&[("index_name", name)]))
            .await?;
        let list: IndexList = Self::parse(path, response).await?;
        Ok(list
            .data
            .into_iter()
            .find(|idx| idx.index_name.as_deref() == Some(name))
            .map(|idx| idx.id))
    }

    async fn create_index(&self, name: &str) -> AnalysisResult<String> {
        let path = "/indexes";
        let body = CreateIndexRequest::new(name);
        let response = self.send(self.request(Method::POST, path).json(&body)).await?;
        let created: CreatedResource = Self::parse(path, response).await?;
        info!(index_id = %created.id, index_name = %name, "Created index");
        Ok(created.id)
    }

    /// Start an indexing task; returns the task id.
    pub async fn create_task(
        &self,
        index_id: &str,
        source: &UploadSource,
        metadata: &UploadMetadata,
    ) -> AnalysisResult<String> {
        let path = "/tasks";
        let mut form = Form::new()
            .text("index_id", index_id.to_string())
            .text("enable_video_stream", "true")
            .text("user_metadata", serde_json::to_string(metadata)?);

        form = match source {
            UploadSource::Url(url) => form.text("video_url", url.clone()),
            UploadSource::File(file) => form.part("video_file", file_part(file).await?),
        };

        let response = self.send(self.request(Method::POST, path).multipart(form)).await?;
        let created: CreatedResource = Self::parse(path, response).await?;
        debug!(task_id = %created.id, "Created indexing task");
        Ok(created.id)
    }

    pub async fn task_status(&self, task_id: &str) -> AnalysisResult<TaskInfo> {
        let path = format!("/tasks/{}", task_id);
        let response = self.send_with_retry(|| self.request(Method::GET, &path)).await?;
        Self::parse(&path, response).await
    }

    /// Poll until the task is ready or failed, bounded by the index timeout.
    pub async fn wait_for_task(&self, task_id: &str) -> AnalysisResult<String> {
        let started = Instant::now();
        loop {
            let task = self.task_status(task_id).await?;
            if task.is_ready() {
                return task.video_id.ok_or_else(|| {
                    AnalysisError::invalid_response(format!("task {} ready without video_id", task_id))
                });
            }
            if task.is_failed() {
                return Err(AnalysisError::IndexingFailed(task.status));
            }
            if started.elapsed() >= self.config.index_timeout {
                return Err(AnalysisError::Timeout(self.config.index_timeout.as_secs()));
            }
            debug!(task_id = %task_id, status = %task.status, "Waiting for indexing");
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> AnalysisResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AnalysisResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = retry_delay(attempt);
                    warn!(
                        "Analysis request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| AnalysisError::request_failed("Unknown error")))
    }

    /// Retry wrapper for requests whose bodies must be rebuilt per attempt.
    async fn send_with_retry<B>(&self, build: B) -> AnalysisResult<Response>
    where
        B: Fn() -> RequestBuilder,
    {
        let build = &build;
        self.with_retry(move || async move {
            let response = self.send(build()).await?;
            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(AnalysisError::from_http_status(status.as_u16(), body));
            }
            Ok(response)
        })
        .await
    }
}

async fn file_part(path: &Path) -> AnalysisResult<Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "video.mp4".to_string());
    Ok(Part::bytes(bytes).file_name(file_name).mime_str("video/mp4")?)
}

#[async_trait]
impl AnalysisService for TwelveLabsClient {
    async fn upload(&self, source: UploadSource, metadata: &UploadMetadata) -> AnalysisResult<String> {
        let index_id = self.ensure_index().await?;
        let task_id = self.create_task(&index_id, &source, metadata).await?;
        info!(task_id = %task_id, index_id = %index_id, "Uploaded video, waiting for indexing");
        let asset_id = self.wait_for_task(&task_id).await?;
        info!(asset_id = %asset_id, "Video indexed");
        Ok(asset_id)
    }

    async fn query(
        &self,
        asset_id: &str,
        text: &str,
        options: &[SearchOption],
        limit: u32,
    ) -> AnalysisResult<Vec<SearchHit>> {
        let index_id = self.ensure_index().await?;
        let filter = serde_json::json!({ "id": [asset_id] }).to_string();
        let path = "/search";

        let response = self
            .send_with_retry(|| {
                let mut form = Form::new()
                    .text("index_id", index_id.clone())
                    .text("query_text", text.to_string())
                    .text("page_limit", limit.to_string())
                    .text("filter", filter.clone());
                for option in options {
                    form = form.text("search_options", option.as_str());
                }
                self.request(Method::POST, path).multipart(form)
            })
            .await?;

        let results: SearchResponse = Self::parse(path, response).await?;
        debug!(query = %text, hits = results.data.len(), "Search complete");
        Ok(results.data.into_iter().map(SearchHit::from).collect())
    }

    async fn summarize(&self, asset_id: &str, prompt: &str) -> AnalysisResult<String> {
        let path = "/summarize";
        let body = SummarizeRequest {
            video_id: asset_id,
            kind: "summary",
            prompt,
        };
        let response = self
            .send_with_retry(|| self.request(Method::POST, path).json(&body))
            .await?;
        let summary: SummarizeResponse = Self::parse(path, response).await?;
        summary
            .summary
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AnalysisError::invalid_response("summary missing from response"))
    }

    fn asset_url(&self, asset_id: &str) -> Option<String> {
        let index_id = self.index_id.get().or(self.config.index_id.as_ref())?;
        Some(format!(
            "{}/indexes/{}/videos/{}",
            self.config.base_url, index_id, asset_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TwelveLabsClient {
        let config = AnalysisConfig {
            poll_interval: Duration::from_millis(10),
            index_timeout: Duration::from_secs(5),
            max_retries: 1,
            ..AnalysisConfig::default()
        }
        .with_api_key("tlk_test")
        .with_base_url(server.uri());
        TwelveLabsClient::new(config).unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            TwelveLabsClient::new(AnalysisConfig::default()),
            Err(AnalysisError::Unconfigured)
        ));
    }

    #[tokio::test]
    async fn test_ensure_index_creates_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .and(query_param("index_name", "scoutpulse-soccer"))
            .and(header("x-api-key", "tlk_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "idx-new"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(client.ensure_index().await.unwrap(), "idx-new");
        assert_eq!(client.ensure_index().await.unwrap(), "idx-new");
        assert_eq!(
            client.asset_url("vid-1").unwrap(),
            format!("{}/indexes/idx-new/videos/vid-1", server.uri())
        );
    }

    #[tokio::test]
    async fn test_configured_index_falls_back_to_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/stale"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"_id": "idx-existing", "index_name": "scoutpulse-soccer"}]
            })))
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.config.index_id = Some("stale".to_string());
        assert_eq!(client.ensure_index().await.unwrap(), "idx-existing");
    }

    #[tokio::test]
    async fn test_upload_polls_until_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/idx-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "idx-1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "task-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks/task-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "task-1", "status": "indexing"})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks/task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "task-1", "status": "ready", "video_id": "vid-42"
            })))
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.config.index_id = Some("idx-1".to_string());
        let meta = UploadMetadata::new("p1", "Test Player", "Cup Final", chrono::Utc::now());
        let asset = client
            .upload(UploadSource::Url("https://cdn.example.com/a.mp4".to_string()), &meta)
            .await
            .unwrap();
        assert_eq!(asset, "vid-42");
    }

    #[tokio::test]
    async fn test_upload_file_reports_failed_indexing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/idx-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "idx-1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "task-2"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks/task-2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "task-2", "status": "failed"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("video_trimmed.mp4");
        std::fs::write(&file, b"not really a video").unwrap();

        let mut client = client(&server);
        client.config.index_id = Some("idx-1".to_string());
        let meta = UploadMetadata::new("p1", "Test Player", "Cup Final", chrono::Utc::now());
        let err = client.upload(UploadSource::File(file), &meta).await.unwrap_err();
        assert!(matches!(err, AnalysisError::IndexingFailed(status) if status == "failed"));
    }

    #[tokio::test]
    async fn test_query_normalizes_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/idx-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "idx-1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"score": 88.0, "video_id": "vid-1", "clips": [{"start": 1.0, "end": 4.0}]},
                    {"score": 72.5, "start": 30.0, "end": 36.0, "video_id": "vid-1"}
                ]
            })))
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.config.index_id = Some("idx-1".to_string());
        let hits = client
            .query("vid-1", "Test Player goal", &[SearchOption::Visual], 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].clips[0].start, 30.0);
    }

    #[tokio::test]
    async fn test_query_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/idx-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"_id": "idx-1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let mut client = client(&server);
        client.config.index_id = Some("idx-1".to_string());
        let err = client
            .query("vid-1", "goal", &[SearchOption::Visual], 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_task_poll_retries_transient_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/task-1"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks/task-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_id": "task-1", "status": "ready", "video_id": "vid-42"
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(client.wait_for_task("task-1").await.unwrap(), "vid-42");
    }

    #[tokio::test]
    async fn test_index_lookup_retries_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/indexes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"_id": "idx-existing", "index_name": "scoutpulse-soccer"}]
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(client.ensure_index().await.unwrap(), "idx-existing");
    }

    #[test]
    fn test_retry_delay_is_capped() {
        assert_eq!(retry_delay(0), Duration::from_millis(500));
        assert_eq!(retry_delay(1), Duration::from_millis(1000));
        assert_eq!(retry_delay(10), Duration::from_millis(RETRY_MAX_DELAY_MS));
        assert_eq!(retry_delay(u32::MAX), Duration::from_millis(RETRY_MAX_DELAY_MS));
    }

    #[tokio::test]
    async fn test_summarize() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"summary": "Strong showing."})),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(client.summarize("vid-1", "prompt").await.unwrap(), "Strong showing.");
    }
}
