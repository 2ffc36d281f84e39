//! URL classification and formatting helpers shared across crates.

use url::Url;

/// Hosted video platforms whose links must be downloaded before upload.
pub const HOSTED_PLATFORM_DOMAINS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum YoutubeIdError {
    #[error("URL is not a valid YouTube URL")]
    InvalidYoutubeUrl,
    #[error("Video ID has invalid format")]
    InvalidVideoId,
    #[error("Video ID not found in URL")]
    VideoIdNotFound,
}

/// Result type for YouTube ID extraction.
pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

fn hosted_host(url: &Url) -> Option<&str> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    let host = url.host_str()?;
    HOSTED_PLATFORM_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
        .then_some(host)
}

/// Whether `video_ref` is an http(s) link on a hosted platform.
///
/// Only these links trigger a local download; everything else is handed to
/// the analysis service as-is.
pub fn is_hosted_platform_url(video_ref: &str) -> bool {
    Url::parse(video_ref.trim())
        .ok()
        .is_some_and(|url| hosted_host(&url).is_some())
}

/// Extract the 11-character video ID from a YouTube link.
///
/// Supports `watch?v=`, `youtu.be/`, `/embed/`, `/v/` and `/shorts/` forms.
pub fn extract_youtube_id(video_ref: &str) -> YoutubeIdResult<String> {
    let url = Url::parse(video_ref.trim()).map_err(|_| YoutubeIdError::InvalidYoutubeUrl)?;
    let host = hosted_host(&url).ok_or(YoutubeIdError::InvalidYoutubeUrl)?;

    let mut segments = url.path_segments().into_iter().flatten().filter(|s| !s.is_empty());

    let candidate = if host == "youtu.be" || host.ends_with(".youtu.be") {
        segments.next().map(str::to_string)
    } else if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        Some(v.into_owned())
    } else {
        match segments.next() {
            Some("embed" | "v" | "shorts") => segments.next().map(str::to_string),
            _ => None,
        }
    };

    let id = candidate.ok_or(YoutubeIdError::VideoIdNotFound)?;
    if id.len() != 11 || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(YoutubeIdError::InvalidVideoId);
    }
    Ok(id)
}

/// Canonical embeddable URL for a hosted-platform link, if an ID can be derived.
pub fn embed_url(video_ref: &str) -> Option<String> {
    extract_youtube_id(video_ref)
        .ok()
        .map(|id| format!("https://www.youtube.com/embed/{}", id))
}

/// Format whole seconds as `M:SS`.
pub fn format_duration(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
