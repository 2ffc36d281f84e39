//! Normalization progress reported through FFmpeg's `-progress` stream.

use std::time::Duration;

/// Snapshot emitted on each `progress=` line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TranscodeProgress {
    /// Media time written so far
    pub encoded: Duration,
    /// Encoding speed relative to realtime; 0 until FFmpeg reports one
    pub speed: f64,
    pub done: bool,
}

impl TranscodeProgress {
    /// Share of `limit` already written, in percent. Output is cut at the
    /// duration cap, so the cap is the natural denominator.
    pub fn percent_of(&self, limit: Duration) -> f64 {
        if limit.is_zero() {
            return 0.0;
        }
        if self.done {
            return 100.0;
        }
        (self.encoded.as_secs_f64() / limit.as_secs_f64() * 100.0).min(100.0)
    }
}
