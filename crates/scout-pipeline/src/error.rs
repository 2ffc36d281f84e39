//! Pipeline error types.

use thiserror::Error;

use scout_analysis::AnalysisError;
use scout_media::MediaError;
use scout_store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors surfaced to callers of the coordinator.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Analysis service is not configured")]
    AnalysisUnavailable,

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    pub fn player_not_found(player_id: impl Into<String>) -> Self {
        Self::PlayerNotFound(player_id.into())
    }
}

/// Why the live branch of a run did not produce a report.
///
/// Every variant sends the run down the simulated branch.
#[derive(Debug, Error)]
pub enum LiveFailure {
    #[error("analysis service not configured")]
    Unconfigured,

    #[error("acquisition failed: {0}")]
    Acquisition(#[from] MediaError),

    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

impl LiveFailure {
    /// Label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LiveFailure::Unconfigured => "unconfigured",
            LiveFailure::Acquisition(_) => "acquisition",
            LiveFailure::Analysis(_) => "analysis",
        }
    }
}
