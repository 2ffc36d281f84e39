//! Analysis gateway error types.

use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis service is not configured")]
    Unconfigured,

    #[error("Analysis service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Video indexing failed with status: {0}")]
    IndexingFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            429 | 500..=599 => Self::ServiceUnavailable(format!("HTTP {}: {}", status, msg)),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, msg)),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AnalysisError::ServiceUnavailable(_) | AnalysisError::Timeout(_) | AnalysisError::Network(_)
        )
    }
}
