//! Wire types for the Twelve Labs REST API and the normalized search hit.

use serde::{Deserialize, Serialize};

/// Default clip length when a flat search item carries no end time.
pub const DEFAULT_CLIP_SECS: f64 = 5.0;

#[derive(Debug, Clone, Deserialize)]
pub struct IndexItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub index_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexList {
    #[serde(default)]
    pub data: Vec<IndexItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexModel {
    pub model_name: String,
    pub model_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIndexRequest {
    pub index_name: String,
    pub models: Vec<IndexModel>,
}

impl CreateIndexRequest {
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            models: vec![IndexModel {
                model_name: "marengo2.7".to_string(),
                model_options: vec!["visual".to_string(), "audio".to_string()],
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Indexing task as returned by `GET /tasks/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub video_id: Option<String>,
}

impl TaskInfo {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }

    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchClip {
    pub start: f64,
    pub end: f64,
    #[serde(default, alias = "video_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// One search result, either grouped (with `clips`) or flat (with `start`/`end`).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub clips: Option<Vec<SearchClip>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<SearchItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarizeRequest<'a> {
    pub video_id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeResponse {
    #[serde(default)]
    pub summary: Option<String>,
}

/// A time range inside a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct HitClip {
    pub start: f64,
    pub end: f64,
    pub clip_id: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Search result in the single shape the rest of the gateway consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Relevance on a 0-100 scale
    pub score: f64,
    pub video_id: Option<String>,
    /// Never empty
    pub clips: Vec<HitClip>,
}

impl SearchHit {
    /// Confidence in `[0, 1]`.
    pub fn confidence(&self) -> f64 {
        self.score / 100.0
    }
}

impl From<SearchItem> for SearchHit {
    fn from(item: SearchItem) -> Self {
        let clips = match item.clips {
            Some(clips) if !clips.is_empty() => clips
                .into_iter()
                .map(|c| HitClip {
                    start: c.start,
                    end: c.end,
                    clip_id: c.id,
                    thumbnail_url: c.thumbnail_url,
                })
                .collect(),
            _ => {
                let start = item.start.unwrap_or(0.0);
                vec![HitClip {
                    start,
                    end: item.end.unwrap_or(start + DEFAULT_CLIP_SECS),
                    clip_id: item.id,
                    thumbnail_url: item.thumbnail_url,
                }]
            }
        };
        Self {
            score: item.score,
            video_id: item.video_id,
            clips,
        }
    }
}
