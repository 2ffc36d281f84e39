//! Pipeline metrics collection.

use metrics::{counter, histogram};

use scout_models::AnalysisSource;

/// Metric name constants for consistency.
pub mod names {
    /// Completed runs by analysis source (live/simulated).
    pub const RUNS_TOTAL: &str = "scout_pipeline_runs_total";

    /// Run duration in seconds by analysis source.
    pub const RUN_DURATION_SECONDS: &str = "scout_pipeline_run_duration_seconds";

    /// Live-branch failures that forced the simulated branch, by kind.
    pub const FALLBACKS_TOTAL: &str = "scout_pipeline_fallbacks_total";

    /// Highlights persisted.
    pub const HIGHLIGHTS_CREATED_TOTAL: &str = "scout_highlights_created_total";

    /// Highlights that failed to persist.
    pub const HIGHLIGHT_PERSIST_FAILURES_TOTAL: &str = "scout_highlight_persist_failures_total";
}

pub fn record_run(source: AnalysisSource, duration_secs: f64) {
    counter!(names::RUNS_TOTAL, "source" => source.as_str()).increment(1);
    histogram!(names::RUN_DURATION_SECONDS, "source" => source.as_str()).record(duration_secs);
}

pub fn record_fallback(kind: &'static str) {
    counter!(names::FALLBACKS_TOTAL, "kind" => kind).increment(1);
}

pub fn record_highlights(created: usize, failed: usize) {
    counter!(names::HIGHLIGHTS_CREATED_TOTAL).increment(created as u64);
    if failed > 0 {
        counter!(names::HIGHLIGHT_PERSIST_FAILURES_TOTAL).increment(failed as u64);
    }
}
