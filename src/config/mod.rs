use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/";
const DEFAULT_MODEL: &str = "whisper-1";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_YT_DLP_PATH: &str = "yt-dlp";

/// Request timeout enforced by the transcription HTTP client
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on a single yt-dlp download
const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration problems are fatal at startup
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set in environment variables")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Transcription service settings
    pub transcription: TranscriptionConfig,

    /// Audio extraction settings
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// Bearer token for the transcription API
    pub api_key: String,

    /// Base URL of the API, always with a trailing slash
    pub api_base: Url,

    /// Speech-to-text model identifier
    pub model: String,

    /// Language hint sent with every request
    pub language: String,

    /// Per-request timeout of the HTTP client
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Path or name of the yt-dlp binary
    pub yt_dlp_path: String,

    /// Deadline for a single download before the child is killed
    pub download_timeout: Duration,

    /// Pause between process exit and the output check, for filesystem flush latency
    pub settle_delay: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: DEFAULT_YT_DLP_PATH.to_string(),
            download_timeout: DEFAULT_EXTRACTION_TIMEOUT,
            settle_delay: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// `OPENAI_API_KEY` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_var("OPENAI_API_KEY")?;

        let api_base = optional_var("OPENAI_API_BASE")
            .map(|mut base| {
                // A trailing slash keeps Url::join from eating the last path segment
                if !base.ends_with('/') {
                    base.push('/');
                }
                Url::parse(&base).map_err(|_| ConfigError::InvalidVar {
                    var: "OPENAI_API_BASE",
                    value: base,
                })
            })
            .transpose()?
            .unwrap_or_else(default_api_base);

        let transcription = TranscriptionConfig {
            api_key,
            api_base,
            model: optional_var("WHISPER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            language: optional_var("TRANSCRIPTION_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        };

        let extractor = ExtractorConfig {
            yt_dlp_path: optional_var("YT_DLP_PATH")
                .unwrap_or_else(|| DEFAULT_YT_DLP_PATH.to_string()),
            download_timeout: duration_var("EXTRACTION_TIMEOUT_SECS", DEFAULT_EXTRACTION_TIMEOUT)?,
            ..ExtractorConfig::default()
        };

        Ok(Self {
            transcription,
            extractor,
        })
    }

    /// Log the loaded configuration with the secret redacted
    pub fn log_summary(&self) {
        tracing::info!(
            "Configuration: api_base={} model={} language={} yt_dlp={} extraction_timeout={}s",
            self.transcription.api_base,
            self.transcription.model,
            self.transcription.language,
            self.extractor.yt_dlp_path,
            self.extractor.download_timeout.as_secs(),
        );
    }
}

fn default_api_base() -> Url {
    // The literal is a valid URL; parsing it cannot fail
    Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL")
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn duration_var(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match optional_var(name) {
        Some(value) => value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidVar { var: name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_base_parses() {
        let base = default_api_base();
        assert_eq!(base.as_str(), DEFAULT_API_BASE);
        assert!(base.as_str().ends_with('/'));
    }

    #[test]
    fn test_api_base_join_keeps_version_segment() {
        let endpoint = default_api_base().join("audio/transcriptions").unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://api.openai.com/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_extractor_defaults() {
        let extractor = ExtractorConfig::default();
        assert_eq!(extractor.yt_dlp_path, "yt-dlp");
        assert_eq!(extractor.settle_delay, Duration::from_secs(1));
    }
}
