//! Video download using yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::command::check_ytdlp;
use crate::error::{MediaError, MediaResult};

/// Best stream at or below 720p, preferring an mp4/m4a pair.
pub const DOWNLOAD_FORMAT: &str =
    "bestvideo[ext=mp4][height<=720]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// File stem used for the downloaded source inside the workspace.
const OUTPUT_STEM: &str = "video";

/// Fetches a hosted-platform video into a directory.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` into `dest_dir`, returning the path of the media file.
    async fn download(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf>;
}

/// yt-dlp backed downloader.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    format: String,
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self {
            format: DOWNLOAD_FORMAT.to_string(),
        }
    }
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the yt-dlp argument list.
    pub fn build_args(&self, url: &str, dest_dir: &Path) -> Vec<String> {
        let template = dest_dir.join(format!("{}.%(ext)s", OUTPUT_STEM));
        vec![
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "-f".to_string(),
            self.format.clone(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(&self, url: &str, dest_dir: &Path) -> MediaResult<PathBuf> {
        check_ytdlp()?;

        info!(url = %url, dest = %dest_dir.display(), "Downloading video with yt-dlp");

        let output = Command::new("yt-dlp")
            .args(self.build_args(url, dest_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            let error_msg = stderr.lines().last().unwrap_or("Unknown error");
            return Err(MediaError::download_failed(format!("yt-dlp failed: {}", error_msg)));
        }

        let path = locate_output(dest_dir).await?;
        let size = tokio::fs::metadata(&path).await?.len();
        info!(
            output = %path.display(),
            size_mb = size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );
        Ok(path)
    }
}

/// Find the merged output; yt-dlp may keep a different extension when no
/// merge was needed.
async fn locate_output(dest_dir: &Path) -> MediaResult<PathBuf> {
    let preferred = dest_dir.join(format!("{}.mp4", OUTPUT_STEM));
    if tokio::fs::try_exists(&preferred).await? {
        return Ok(preferred);
    }

    let mut entries = tokio::fs::read_dir(dest_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_candidate = path.file_stem().is_some_and(|s| s == OUTPUT_STEM)
            && path.extension().is_some_and(|ext| ext != "part");
        if is_candidate {
            return Ok(path);
        }
    }

    Err(MediaError::download_failed("Downloaded video file not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let downloader = YtDlpDownloader::new();
        let args = downloader.build_args("https://youtu.be/dQw4w9WgXcQ", Path::new("/tmp/ws"));

        let f = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f + 1], DOWNLOAD_FORMAT);
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"/tmp/ws/video.%(ext)s".to_string()));
        assert_eq!(args.last().unwrap(), "https://youtu.be/dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_locate_output_prefers_mp4() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("video.webm"), b"x").unwrap();
        std::fs::write(dir.path().join("video.mp4"), b"x").unwrap();
        let found = locate_output(dir.path()).await.unwrap();
        assert_eq!(found, dir.path().join("video.mp4"));
    }

    #[tokio::test]
    async fn test_locate_output_falls_back_to_other_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("video.webm"), b"x").unwrap();
        let found = locate_output(dir.path()).await.unwrap();
        assert_eq!(found, dir.path().join("video.webm"));
    }

    #[tokio::test]
    async fn test_locate_output_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("video.mp4.part"), b"x").unwrap();
        assert!(locate_output(dir.path()).await.is_err());
    }
}
