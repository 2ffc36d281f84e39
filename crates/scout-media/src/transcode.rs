//! Normalization of downloaded media into the analyzer's canonical format.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::clamp_max_duration;
use crate::error::{MediaError, MediaResult};

/// 30 fps, clamp to 1280x720 keeping aspect ratio.
pub const NORMALIZE_FILTER: &str =
    "fps=30,scale='min(1280,iw)':'min(720,ih)':force_original_aspect_ratio=decrease";

/// Output file name inside the run workspace.
pub const NORMALIZED_FILE_NAME: &str = "video_trimmed.mp4";

/// Runs the external transcoding process.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Normalize `input`, trimming to at most `max_duration_secs`, and return
    /// the output path (next to the input).
    async fn run(&self, input: &Path, max_duration_secs: u32) -> MediaResult<PathBuf>;
}

/// FFmpeg backed transcoder.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    timeout_secs: u64,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self { timeout_secs: 900 }
    }
}

impl FfmpegTranscoder {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

/// Build the fixed normalization command.
pub fn normalize_command(input: &Path, output: &Path, max_duration_secs: u32) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .max_duration(clamp_max_duration(max_duration_secs as i64))
        .video_filter(NORMALIZE_FILTER)
        .video_codec("libx264")
        .preset("veryfast")
        .crf(23)
        .pixel_format("yuv420p")
        .keyframe_interval(60)
        .faststart()
        .audio_codec("aac")
        .audio_bitrate("128k")
        .audio_sample_rate(44100)
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn run(&self, input: &Path, max_duration_secs: u32) -> MediaResult<PathBuf> {
        let parent = input
            .parent()
            .ok_or_else(|| MediaError::FileNotFound(input.to_path_buf()))?;
        let output = parent.join(NORMALIZED_FILE_NAME);
        let cmd = normalize_command(input, &output, max_duration_secs);

        let limit = Duration::from_secs(u64::from(max_duration_secs));
        let started = Instant::now();
        FfmpegRunner::new()
            .with_timeout(self.timeout_secs)
            .run_with_progress(&cmd, move |progress| {
                debug!(percent = progress.percent_of(limit), speed = progress.speed, "Transcode progress");
            })
            .await?;

        if !tokio::fs::try_exists(&output).await? {
            return Err(MediaError::NoOutput(output));
        }

        // The source is no longer needed once the normalized copy exists
        tokio::fs::remove_file(input).await?;

        info!(
            output = %output.display(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Normalized video"
        );
        Ok(output)
    }
}
