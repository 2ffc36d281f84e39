//! Acquisition configuration.

use std::path::PathBuf;
use std::time::Duration;

/// The analyzer rejects clips shorter than this.
pub const MIN_DURATION_FLOOR_SECS: u32 = 10;

/// Upper bound on the trimmed clip regardless of configuration.
pub const MAX_DURATION_CEILING_SECS: u32 = 7200;

/// Clamp a requested maximum clip duration into the supported range.
pub fn clamp_max_duration(requested: i64) -> u32 {
    requested.clamp(MIN_DURATION_FLOOR_SECS as i64, MAX_DURATION_CEILING_SECS as i64) as u32
}

/// Media acquisition configuration.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Maximum duration of the normalized clip in seconds (already clamped)
    pub max_duration_secs: u32,
    /// Retain the temporary workspace after the run (debugging)
    pub keep_temp: bool,
    /// Parent directory for temporary workspaces (system temp dir if unset)
    pub work_dir: Option<PathBuf>,
    /// FFmpeg process timeout
    pub ffmpeg_timeout: Duration,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 600,
            keep_temp: false,
            work_dir: None,
            ffmpeg_timeout: Duration::from_secs(900),
        }
    }
}

impl AcquireConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_duration_secs: clamp_max_duration(
                std::env::var("YOUTUBE_MAX_DOWNLOAD_SECONDS")
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(600),
            ),
            keep_temp: std::env::var("KEEP_YT_TEMP")
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false),
            work_dir: std::env::var("SCOUT_WORK_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            ffmpeg_timeout: Duration::from_secs(
                std::env::var("FFMPEG_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(900),
            ),
        }
    }

    /// Override the maximum duration, clamping into the supported range.
    pub fn with_max_duration(mut self, secs: i64) -> Self {
        self.max_duration_secs = clamp_max_duration(secs);
        self
    }
}
