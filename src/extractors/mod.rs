use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

pub mod yt_dlp;

pub use yt_dlp::YtDlpExtractor;

/// Hosts the service accepts; anything else is rejected before a process is spawned
static VIDEO_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+$")
        .expect("video URL pattern is valid")
});

/// Errors raised while producing the temporary audio artifact
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("Invalid YouTube URL format: {0}")]
    InvalidUrl(String),

    #[error("yt-dlp is not available at '{0}', install it from https://github.com/yt-dlp/yt-dlp")]
    ToolUnavailable(String),

    #[error("audio download failed with exit code {code:?}: {stderr}")]
    DownloadFailed { code: Option<i32>, stderr: String },

    #[error("audio download timed out after {0:?}")]
    Timeout(Duration),

    #[error("Audio file was not created successfully: {0}")]
    MissingOutput(PathBuf),

    #[error("Audio file is empty: {0}")]
    EmptyOutput(PathBuf),

    #[error("audio file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for producing a temporary audio file from a video URL
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Download and transcode the audio track, returning the path to a
    /// non-empty file owned by the caller
    async fn extract(&self, url: &str) -> Result<PathBuf, ExtractError>;
}

/// Check a URL against the fixed host allowlist
pub fn validate_url(url: &str) -> Result<(), ExtractError> {
    if VIDEO_URL_PATTERN.is_match(url) {
        Ok(())
    } else {
        Err(ExtractError::InvalidUrl(url.to_string()))
    }
}
