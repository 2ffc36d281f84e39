//! Narrow contract over the external video-understanding service.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AnalysisResult;
use crate::types::SearchHit;

/// Media handed to the service.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadSource {
    /// Service fetches the media itself
    Url(String),
    /// Local file sent in the request body
    File(PathBuf),
}

/// `user_metadata` attached to an indexing task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadMetadata {
    pub player_id: String,
    pub video_title: String,
    #[serde(rename = "match")]
    pub match_name: String,
    pub date: String,
}

impl UploadMetadata {
    pub fn new(
        player_id: impl Into<String>,
        player_name: &str,
        match_name: impl Into<String>,
        date: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let match_name = match_name.into();
        Self {
            player_id: player_id.into(),
            video_title: format!("{}_{}", player_name, match_name),
            match_name,
            date: date.to_rfc3339(),
        }
    }
}

/// Search modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOption {
    Visual,
    Audio,
}

impl SearchOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOption::Visual => "visual",
            SearchOption::Audio => "audio",
        }
    }
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Index the media and wait until it is searchable; returns the asset id.
    async fn upload(&self, source: UploadSource, metadata: &UploadMetadata) -> AnalysisResult<String>;

    /// Semantic query scoped to one indexed asset.
    async fn query(
        &self,
        asset_id: &str,
        text: &str,
        options: &[SearchOption],
        limit: u32,
    ) -> AnalysisResult<Vec<SearchHit>>;

    /// Free-text summary of an asset.
    async fn summarize(&self, asset_id: &str, prompt: &str) -> AnalysisResult<String>;

    /// Service-side URL for an indexed asset, if one is known.
    fn asset_url(&self, asset_id: &str) -> Option<String>;
}
