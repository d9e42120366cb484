use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::{sleep, timeout};

use super::{validate_url, AudioExtractor, ExtractError};
use crate::config::ExtractorConfig;
use crate::utils;

/// Audio extractor shelling out to yt-dlp
pub struct YtDlpExtractor {
    yt_dlp_path: String,
    download_timeout: Duration,
    settle_delay: Duration,
}

impl YtDlpExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            download_timeout: config.download_timeout,
            settle_delay: config.settle_delay,
        }
    }

    /// Check if yt-dlp is available, returning its version
    pub async fn check_availability(&self) -> Option<String> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            }
            _ => None,
        }
    }

    /// Run the download to completion within the deadline
    async fn download(&self, url: &str, output_path: &Path) -> Result<(), ExtractError> {
        let output_arg = output_path.to_string_lossy();

        // Argument list matches the original deployment: extract audio only,
        // transcode to best-quality mp3, never expand playlists
        let child = Command::new(&self.yt_dlp_path)
            .args([
                url,
                "-x",
                "--audio-format",
                "mp3",
                "--audio-quality",
                "0",
                "-o",
                output_arg.as_ref(),
                "--no-playlist",
                "--no-warnings",
                "--verbose",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The child must not outlive the deadline below
            .kill_on_drop(true)
            .spawn()?;

        let output = timeout(self.download_timeout, child.wait_with_output())
            .await
            .map_err(|_| ExtractError::Timeout(self.download_timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::DownloadFailed {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        // Short settle pause so a just-flushed file is visible to the check below
        sleep(self.settle_delay).await;

        self.validate_output(output_path).await
    }

    /// Verify the downloaded artifact exists and is non-empty
    async fn validate_output(&self, path: &Path) -> Result<(), ExtractError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::MissingOutput(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };

        if metadata.len() == 0 {
            return Err(ExtractError::EmptyOutput(path.to_path_buf()));
        }

        Ok(())
    }
}

#[async_trait]
impl AudioExtractor for YtDlpExtractor {
    async fn extract(&self, url: &str) -> Result<PathBuf, ExtractError> {
        // Reject bad URLs before spawning anything, the availability probe included
        validate_url(url)?;

        let version = self
            .check_availability()
            .await
            .ok_or_else(|| ExtractError::ToolUnavailable(self.yt_dlp_path.clone()))?;
        tracing::debug!("yt-dlp version: {}", version);

        let output_path = utils::temp_audio_path();
        tracing::info!(
            "Starting audio extraction for URL: {} -> {}",
            url,
            output_path.display()
        );

        match self.download(url, &output_path).await {
            Ok(()) => {
                tracing::info!("Audio extraction completed: {}", output_path.display());
                Ok(output_path)
            }
            Err(err) => {
                // Never leave a partial artifact behind
                utils::cleanup_audio(&output_path).await;
                Err(err)
            }
        }
    }
}
