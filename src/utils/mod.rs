use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Generate a unique path for a temporary audio artifact in the system temp directory
pub fn temp_audio_path() -> PathBuf {
    // UUID-named so concurrent requests can never contend over one file
    std::env::temp_dir().join(format!("audio_{}.mp3", Uuid::new_v4()))
}

/// Delete a temporary audio file, best-effort
///
/// Cleanup failures are logged and swallowed, never propagated to the
/// caller.
pub async fn cleanup_audio(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!("Cleaned up audio file: {}", path.display());
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!("Failed to clean up audio file {}: {}", path.display(), err);
        }
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    // Check for yt-dlp
    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for audio extraction".to_string());
    }

    // Check for ffmpeg (yt-dlp needs it for the mp3 transcode)
    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required by yt-dlp for audio conversion".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
