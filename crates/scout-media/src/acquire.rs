//! Resolve a video reference into something the analyzer can ingest.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::{info, warn};

use scout_models::is_hosted_platform_url;

use crate::config::AcquireConfig;
use crate::download::{Downloader, YtDlpDownloader};
use crate::error::MediaResult;
use crate::transcode::{FfmpegTranscoder, Transcoder};
use crate::workspace::MediaWorkspace;

const DOWNLOAD_DURATION_SECONDS: &str = "scout_download_duration_seconds";
const TRANSCODE_DURATION_SECONDS: &str = "scout_transcode_duration_seconds";

/// A normalized local file plus the workspace that owns it.
#[derive(Debug)]
pub struct LocalMedia {
    path: PathBuf,
    workspace: MediaWorkspace,
}

impl LocalMedia {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }
}

/// Outcome of [`MediaAcquirer::acquire`].
#[derive(Debug)]
pub enum AcquiredMedia {
    /// Downloaded and normalized into a run-owned workspace
    Local(LocalMedia),
    /// Handed to the analyzer by reference
    Passthrough(String),
}

impl AcquiredMedia {
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            AcquiredMedia::Local(local) => Some(local.path()),
            AcquiredMedia::Passthrough(_) => None,
        }
    }

    pub fn passthrough_url(&self) -> Option<&str> {
        match self {
            AcquiredMedia::Local(_) => None,
            AcquiredMedia::Passthrough(url) => Some(url),
        }
    }

    /// Drop all temporary state held for this media.
    pub fn release(self) -> MediaResult<()> {
        match self {
            AcquiredMedia::Local(local) => local.workspace.release(),
            AcquiredMedia::Passthrough(_) => Ok(()),
        }
    }
}

/// Downloads and normalizes hosted-platform videos; passes everything else through.
#[derive(Clone)]
pub struct MediaAcquirer {
    config: AcquireConfig,
    downloader: Arc<dyn Downloader>,
    transcoder: Arc<dyn Transcoder>,
}

impl MediaAcquirer {
    pub fn new(
        config: AcquireConfig,
        downloader: Arc<dyn Downloader>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            config,
            downloader,
            transcoder,
        }
    }

    /// yt-dlp + FFmpeg acquirer.
    pub fn from_config(config: AcquireConfig) -> Self {
        let transcoder = FfmpegTranscoder::new(config.ffmpeg_timeout.as_secs());
        Self::new(config, Arc::new(YtDlpDownloader::new()), Arc::new(transcoder))
    }

    pub fn config(&self) -> &AcquireConfig {
        &self.config
    }

    /// Only hosted-platform links are fetched locally.
    pub fn requires_download(video_ref: &str) -> bool {
        is_hosted_platform_url(video_ref)
    }

    /// Acquire `video_ref`.
    ///
    /// On any error the workspace created for this call has already been
    /// removed (or retained, if `keep_temp` is set) by the time this returns.
    pub async fn acquire(&self, video_ref: &str) -> MediaResult<AcquiredMedia> {
        if !Self::requires_download(video_ref) {
            return Ok(AcquiredMedia::Passthrough(video_ref.to_string()));
        }

        let workspace = MediaWorkspace::create(self.config.work_dir.as_deref(), self.config.keep_temp)?;

        let started = Instant::now();
        let downloaded = match self.downloader.download(video_ref, workspace.path()).await {
            Ok(path) => path,
            Err(e) => {
                warn!(url = %video_ref, "Download failed: {}", e);
                discard(workspace);
                return Err(e);
            }
        };
        histogram!(DOWNLOAD_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        let started = Instant::now();
        let normalized = match self.transcoder.run(&downloaded, self.config.max_duration_secs).await {
            Ok(path) => path,
            Err(e) => {
                warn!(url = %video_ref, "Transcode failed: {}", e);
                discard(workspace);
                return Err(e);
            }
        };
        histogram!(TRANSCODE_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        info!(
            url = %video_ref,
            path = %normalized.display(),
            max_duration_secs = self.config.max_duration_secs,
            "Acquired media"
        );

        Ok(AcquiredMedia::Local(LocalMedia {
            path: normalized,
            workspace,
        }))
    }
}

fn discard(workspace: MediaWorkspace) {
    if let Err(e) = workspace.release() {
        warn!("Failed to clean up media workspace: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeDownloader {
        fail: bool,
        seen_dir: Mutex<Option<PathBuf>>,
    }

    #[async_trait]
    impl Downloader for FakeDownloader {
        async fn download(&self, _url: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
            *self.seen_dir.lock().unwrap() = Some(dest_dir.to_path_buf());
            if self.fail {
                return Err(MediaError::download_failed("boom"));
            }
            let path = dest_dir.join("video.mp4");
            tokio::fs::write(&path, b"source").await?;
            Ok(path)
        }
    }

    struct FakeTranscoder {
        fail: bool,
        seen_duration: Mutex<Option<u32>>,
    }

    #[async_trait]
    impl Transcoder for FakeTranscoder {
        async fn run(&self, input: &Path, max_duration_secs: u32) -> MediaResult<PathBuf> {
            *self.seen_duration.lock().unwrap() = Some(max_duration_secs);
            if self.fail {
                return Err(MediaError::ffmpeg_failed("bad input", None, Some(1)));
            }
            let output = input.with_file_name("video_trimmed.mp4");
            tokio::fs::write(&output, b"normalized").await?;
            Ok(output)
        }
    }

    fn acquirer(
        parent: &Path,
        keep: bool,
        fail_download: bool,
        fail_transcode: bool,
    ) -> (MediaAcquirer, Arc<FakeDownloader>, Arc<FakeTranscoder>) {
        let downloader = Arc::new(FakeDownloader {
            fail: fail_download,
            seen_dir: Mutex::new(None),
        });
        let transcoder = Arc::new(FakeTranscoder {
            fail: fail_transcode,
            seen_duration: Mutex::new(None),
        });
        let config = AcquireConfig {
            work_dir: Some(parent.to_path_buf()),
            keep_temp: keep,
            ..AcquireConfig::default()
        };
        (
            MediaAcquirer::new(config, downloader.clone(), transcoder.clone()),
            downloader,
            transcoder,
        )
    }

    fn leftover_entries(parent: &Path) -> usize {
        std::fs::read_dir(parent).unwrap().count()
    }

    #[tokio::test]
    async fn test_direct_url_passes_through() {
        let parent = tempfile::tempdir().unwrap();
        let (acquirer, downloader, _) = acquirer(parent.path(), false, false, false);

        let media = acquirer.acquire("https://cdn.example.com/match.mp4").await.unwrap();
        assert_eq!(media.passthrough_url(), Some("https://cdn.example.com/match.mp4"));
        assert!(downloader.seen_dir.lock().unwrap().is_none());
        media.release().unwrap();
        assert_eq!(leftover_entries(parent.path()), 0);
    }

    #[tokio::test]
    async fn test_hosted_link_downloads_and_cleans_up() {
        let parent = tempfile::tempdir().unwrap();
        let (acquirer, _, transcoder) = acquirer(parent.path(), false, false, false);

        let media = acquirer.acquire("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await.unwrap();
        let path = media.local_path().unwrap().to_path_buf();
        assert!(path.ends_with("video_trimmed.mp4"));
        assert!(path.exists());
        assert_eq!(*transcoder.seen_duration.lock().unwrap(), Some(600));

        media.release().unwrap();
        assert!(!path.exists());
        assert_eq!(leftover_entries(parent.path()), 0);
    }

    #[tokio::test]
    async fn test_download_failure_removes_workspace() {
        let parent = tempfile::tempdir().unwrap();
        let (acquirer, downloader, _) = acquirer(parent.path(), false, true, false);

        let err = acquirer.acquire("https://youtu.be/dQw4w9WgXcQ").await.unwrap_err();
        assert!(err.is_download_failure());
        let dir = downloader.seen_dir.lock().unwrap().clone().unwrap();
        assert!(!dir.exists());
        assert_eq!(leftover_entries(parent.path()), 0);
    }

    #[tokio::test]
    async fn test_transcode_failure_removes_workspace() {
        let parent = tempfile::tempdir().unwrap();
        let (acquirer, _, _) = acquirer(parent.path(), false, false, true);

        let err = acquirer.acquire("https://youtu.be/dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, MediaError::FfmpegFailed { .. }));
        assert_eq!(leftover_entries(parent.path()), 0);
    }

    #[tokio::test]
    async fn test_keep_temp_retains_workspace() {
        let parent = tempfile::tempdir().unwrap();
        let (acquirer, _, _) = acquirer(parent.path(), true, false, false);

        let media = acquirer.acquire("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
        media.release().unwrap();
        assert_eq!(leftover_entries(parent.path()), 1);
    }

    #[tokio::test]
    async fn test_dropped_media_is_cleaned_up() {
        let parent = tempfile::tempdir().unwrap();
        let (acquirer, _, _) = acquirer(parent.path(), false, false, false);

        let media = acquirer.acquire("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
        drop(media);
        assert_eq!(leftover_entries(parent.path()), 0);
    }
}
