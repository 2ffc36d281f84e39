//! Media acquisition for the ScoutPulse pipeline.
//!
//! This crate provides:
//! - Hosted-platform link detection and yt-dlp download
//! - FFmpeg normalization with a fixed filter chain and bounded duration
//! - Progress parsing from `-progress pipe:2`
//! - A per-run temporary workspace that is always cleaned up

pub mod acquire;
pub mod command;
pub mod config;
pub mod download;
pub mod error;
pub mod progress;
pub mod transcode;
pub mod workspace;

pub use acquire::{AcquiredMedia, LocalMedia, MediaAcquirer};
pub use command::{check_ffmpeg, check_ytdlp, FfmpegCommand, FfmpegRunner};
pub use config::{clamp_max_duration, AcquireConfig, MAX_DURATION_CEILING_SECS, MIN_DURATION_FLOOR_SECS};
pub use download::{Downloader, YtDlpDownloader};
pub use error::{MediaError, MediaResult};
pub use progress::TranscodeProgress;
pub use transcode::{FfmpegTranscoder, Transcoder};
pub use workspace::MediaWorkspace;
