use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;
use url::Url;

use crate::config::TranscriptionConfig;

pub mod retry;

pub use retry::RetryPolicy;

/// Errors raised while turning an audio file into text
#[derive(thiserror::Error, Debug)]
pub enum TranscribeError {
    #[error("Audio file not found at path: {0}")]
    MissingFile(PathBuf),

    #[error("Audio file is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("Audio file is not readable: {0}")]
    Unreadable(PathBuf),

    #[error("transcription request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("transcription service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("No transcription text received from the API")]
    EmptyTranscript,

    #[error("Failed to transcribe audio after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<TranscribeError>,
    },
}

impl TranscribeError {
    /// Whether another attempt could plausibly succeed
    ///
    /// Local file state and client-side API rejections are terminal; transport
    /// failures, server errors, and rate limiting are worth backing off for.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranscribeError::Request(_) => true,
            TranscribeError::Api { status, .. } => *status >= 500 || *status == 429,
            TranscribeError::EmptyTranscript => true,
            TranscribeError::MissingFile(_)
            | TranscribeError::EmptyFile(_)
            | TranscribeError::Unreadable(_)
            | TranscribeError::RetriesExhausted { .. } => false,
        }
    }
}

/// Trait for converting an audio file to plain text
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the file, retrying transient failures within a bounded budget
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscribeError>;
}

/// JSON error envelope returned by the API on failure
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Speech-to-text client for the OpenAI transcription API
pub struct WhisperClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    language: String,
    policy: RetryPolicy,
}

impl WhisperClient {
    /// Build a client with the request timeout baked into the HTTP layer
    pub fn new(config: &TranscriptionConfig) -> crate::Result<Self> {
        use anyhow::Context;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build transcription HTTP client")?;

        let endpoint = config
            .api_base
            .join("audio/transcriptions")
            .context("Failed to construct transcription endpoint URL")?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
            policy: RetryPolicy::default(),
        })
    }

    /// One transcription attempt: re-validate the file, stream it up, read text back
    async fn request_transcription(
        &self,
        audio_path: &Path,
        attempt: u32,
    ) -> Result<String, TranscribeError> {
        validate_audio_file(audio_path).await?;

        tracing::info!(
            "Attempt {}: starting transcription of file {}",
            attempt,
            audio_path.display()
        );

        // A fresh stream per attempt; the transport consumes it in flight
        let file = tokio::fs::File::open(audio_path)
            .await
            .map_err(|_| TranscribeError::Unreadable(audio_path.to_path_buf()))?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let file_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let part = multipart::Part::stream(body)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "text")
            .part("file", part);

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Api {
                status: status.as_u16(),
                message: parse_error_message(&body),
            });
        }

        let text = response.text().await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(TranscribeError::EmptyTranscript);
        }

        Ok(text.to_string())
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscribeError> {
        let transcript = retry::retry_with_backoff(&self.policy, move |attempt| {
            self.request_transcription(audio_path, attempt)
        })
        .await?;

        tracing::info!("Transcription successful ({} chars)", transcript.len());
        Ok(transcript)
    }
}

/// Pre-flight checks run before every upload attempt
async fn validate_audio_file(path: &Path) -> Result<(), TranscribeError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(TranscribeError::MissingFile(path.to_path_buf()));
        }
        Err(_) => return Err(TranscribeError::Unreadable(path.to_path_buf())),
    };

    if metadata.len() == 0 {
        return Err(TranscribeError::EmptyFile(path.to_path_buf()));
    }

    Ok(())
}

/// Pull a human-readable message out of the API error body, JSON or not
fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
