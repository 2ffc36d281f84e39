//! Structured run logging.
//!
//! Every line carries the run id and operation so a single run can be
//! followed through interleaved output from concurrent runs.

use tracing::{error, info, warn, Span};

use scout_models::{PipelineStage, RunId};

/// Run-scoped logger with consistent fields.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    operation: String,
}

impl RunLogger {
    /// Create a logger for one run of `operation` (e.g. "process_video").
    pub fn new(run_id: &RunId, operation: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run started: {}", message
        );
    }

    /// Log a transition into `stage`.
    pub fn log_stage(&self, stage: PipelineStage) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            stage = stage.as_str(),
            "Run stage: {}", stage.as_str()
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run completed: {}", message
        );
    }

    /// Span that nests everything logged while it is entered.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "pipeline_run",
            run_id = %self.run_id,
            operation = %self.operation
        )
    }
}
