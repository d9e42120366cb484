use async_graphql::SimpleObject;
use std::sync::Arc;

use crate::extractors::AudioExtractor;
use crate::transcribe::SpeechToText;
use crate::utils;
use crate::AnalyzeError;

/// Sentiment returned until a real analysis pass exists
pub const SENTIMENT_PLACEHOLDER: &str = "Positive";

/// Result of analyzing one video
#[derive(Debug, Clone, SimpleObject)]
pub struct Analysis {
    /// Plain-text transcript of the audio track
    pub transcription: String,

    /// Overall sentiment of the transcript
    pub sentiment: String,
}

/// Sequences extraction, transcription, and the sentiment stub for one request
///
/// The pipeline owns no per-request state; each call creates exactly one
/// temporary audio file and guarantees it is deleted before returning,
/// whatever the outcome.
pub struct AnalysisPipeline {
    extractor: Arc<dyn AudioExtractor>,
    transcriber: Arc<dyn SpeechToText>,
}

impl AnalysisPipeline {
    pub fn new(extractor: Arc<dyn AudioExtractor>, transcriber: Arc<dyn SpeechToText>) -> Self {
        Self {
            extractor,
            transcriber,
        }
    }

    /// Run the full analysis for a video URL
    pub async fn analyze(&self, url: &str) -> Result<Analysis, AnalyzeError> {
        // Extraction cleans up after itself on failure, so the temp file
        // exists if and only if this returns Ok
        let audio_path = self.extractor.extract(url).await?;

        let transcription = self.transcriber.transcribe(&audio_path).await;

        // Cleanup runs on both branches before the error can propagate
        utils::cleanup_audio(&audio_path).await;

        let transcription = transcription?;

        // TODO: replace the placeholder with a real sentiment pass over the transcript
        Ok(Analysis {
            transcription,
            sentiment: SENTIMENT_PLACEHOLDER.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ExtractError;
    use crate::transcribe::TranscribeError;
    use async_trait::async_trait;
    use mockall::mock;
    use std::path::{Path, PathBuf};

    mock! {
        Extractor {}

        #[async_trait]
        impl AudioExtractor for Extractor {
            async fn extract(&self, url: &str) -> Result<PathBuf, ExtractError>;
        }
    }

    mock! {
        Transcriber {}

        #[async_trait]
        impl SpeechToText for Transcriber {
            async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscribeError>;
        }
    }

    fn write_temp_audio(bytes: usize) -> PathBuf {
        let path = crate::utils::temp_audio_path();
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    fn exhausted() -> TranscribeError {
        TranscribeError::RetriesExhausted {
            attempts: 3,
            source: Box::new(TranscribeError::Api {
                status: 500,
                message: "internal error".to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn test_analyze_returns_transcript_and_placeholder_sentiment() {
        let audio_path = write_temp_audio(5000);

        let mut extractor = MockExtractor::new();
        let extracted = audio_path.clone();
        extractor
            .expect_extract()
            .times(1)
            .returning(move |_| Ok(extracted.clone()));

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .times(1)
            .returning(|_| Ok("hello world".to_string()));

        let pipeline = AnalysisPipeline::new(Arc::new(extractor), Arc::new(transcriber));
        let analysis = pipeline.analyze("https://youtu.be/abc123").await.unwrap();

        assert_eq!(analysis.transcription, "hello world");
        assert_eq!(analysis.sentiment, "Positive");
        // The temp file never outlives the request
        assert!(!audio_path.exists());
    }

    #[tokio::test]
    async fn test_analyze_cleans_up_when_transcription_fails() {
        let audio_path = write_temp_audio(5000);

        let mut extractor = MockExtractor::new();
        let extracted = audio_path.clone();
        extractor
            .expect_extract()
            .times(1)
            .returning(move |_| Ok(extracted.clone()));

        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .times(1)
            .returning(|_| Err(exhausted()));

        let pipeline = AnalysisPipeline::new(Arc::new(extractor), Arc::new(transcriber));
        let err = pipeline.analyze("https://youtu.be/abc123").await.unwrap_err();

        assert!(matches!(err, AnalyzeError::Transcription(_)));
        assert_eq!(err.code(), "TRANSCRIPTION_FAILED");
        assert!(!audio_path.exists());
    }

    #[tokio::test]
    async fn test_analyze_skips_transcription_when_extraction_fails() {
        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract()
            .times(1)
            .returning(|url| Err(ExtractError::InvalidUrl(url.to_string())));

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().times(0);

        let pipeline = AnalysisPipeline::new(Arc::new(extractor), Arc::new(transcriber));
        let err = pipeline.analyze("not-a-video-link").await.unwrap_err();

        assert!(matches!(
            err,
            AnalyzeError::Extraction(ExtractError::InvalidUrl(_))
        ));
        assert_eq!(err.code(), "BAD_USER_INPUT");
    }
}
