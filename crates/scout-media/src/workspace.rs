//! Per-run temporary working directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::MediaResult;

/// Prefix for every workspace directory.
pub const WORKSPACE_PREFIX: &str = "scoutpulse-yt-";

/// Temporary directory owned by exactly one pipeline run.
///
/// The directory is removed when the workspace is released or dropped,
/// whichever comes first, unless `keep` was requested.
#[derive(Debug)]
pub struct MediaWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
    keep: bool,
}

impl MediaWorkspace {
    /// Create a fresh workspace under `parent` (or the system temp dir).
    pub fn create(parent: Option<&Path>, keep: bool) -> MediaResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "Created media workspace");
        Ok(Self {
            dir: Some(dir),
            path,
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this workspace survives release.
    pub fn is_retained(&self) -> bool {
        self.keep
    }

    /// Remove the directory now, reporting any removal error.
    pub fn release(mut self) -> MediaResult<()> {
        match self.dir.take() {
            Some(dir) if self.keep => {
                let path = dir.into_path();
                info!(path = %path.display(), "Retaining media workspace for debugging");
                Ok(())
            }
            Some(dir) => {
                dir.close()?;
                debug!(path = %self.path.display(), "Removed media workspace");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for MediaWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if self.keep {
                let path = dir.into_path();
                info!(path = %path.display(), "Retaining media workspace for debugging");
            } else if let Err(e) = dir.close() {
                warn!(path = %self.path.display(), "Failed to remove media workspace: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_removes_directory() {
        let parent = tempfile::tempdir().unwrap();
        let workspace = MediaWorkspace::create(Some(parent.path()), false).unwrap();
        let path = workspace.path().to_path_buf();
        std::fs::write(path.join("video.mp4"), b"data").unwrap();
        assert!(path.exists());

        workspace.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let workspace = MediaWorkspace::create(Some(parent.path()), false).unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_keep_retains_directory() {
        let parent = tempfile::tempdir().unwrap();
        let workspace = MediaWorkspace::create(Some(parent.path()), true).unwrap();
        let path = workspace.path().to_path_buf();
        workspace.release().unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(WORKSPACE_PREFIX));
    }
}
