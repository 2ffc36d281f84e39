//! Store metrics collection.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Store operations by operation and outcome.
    pub const OPERATIONS_TOTAL: &str = "scout_store_operations_total";

    /// Operation latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "scout_store_latency_seconds";
}

/// Record a completed store operation.
pub fn record_operation(operation: &'static str, ok: bool, latency_ms: f64) {
    counter!(
        names::OPERATIONS_TOTAL,
        "operation" => operation,
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);

    histogram!(names::LATENCY_SECONDS, "operation" => operation).record(latency_ms / 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::OPERATIONS_TOTAL.starts_with("scout_store_"));
        assert!(names::LATENCY_SECONDS.contains("latency"));
    }
}
