//! Video Insight - a GraphQL service for transcribing and analyzing online videos
//!
//! This library extracts the audio track of a video URL with yt-dlp, transcribes it
//! through the OpenAI speech-to-text API, and serves the result over a single
//! GraphQL query.

pub mod analyze;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod server;
pub mod transcribe;
pub mod utils;

pub use analyze::{Analysis, AnalysisPipeline};
pub use cli::Cli;
pub use config::Config;
pub use extractors::{AudioExtractor, ExtractError, YtDlpExtractor};
pub use transcribe::{SpeechToText, TranscribeError, WhisperClient};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Request-level failure, aggregated across the pipeline stages
#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Transcription(#[from] TranscribeError),
}

impl AnalyzeError {
    /// Machine-readable code surfaced in GraphQL error extensions
    pub fn code(&self) -> &'static str {
        match self {
            AnalyzeError::Extraction(ExtractError::InvalidUrl(_)) => "BAD_USER_INPUT",
            AnalyzeError::Extraction(_) => "EXTRACTION_FAILED",
            AnalyzeError::Transcription(_) => "TRANSCRIPTION_FAILED",
        }
    }
}
