use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use super::TranscribeError;

/// Bounded retry with exponential backoff for transcription attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget, first try included
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles per completed attempt
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff after `attempt` completed attempts: base * 2^attempt, jittered
    /// into [0.5, 1.0) of that value
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay.as_secs_f64() * 2f64.powi(attempt as i32);
        let jitter = 0.5 + rand::random::<f64>() * 0.5;
        Duration::from_secs_f64(exponential * jitter)
    }
}

/// Drive `op` until it succeeds or the attempt budget runs out
///
/// Only retryable errors consume further attempts; a terminal error (local
/// file state, non-retryable HTTP status) is returned as-is from the attempt
/// that produced it. Exhaustion wraps the last error with the attempt count.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, TranscribeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, TranscribeError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) if attempt >= policy.max_attempts => {
                return Err(TranscribeError::RetriesExhausted {
                    attempts: attempt,
                    source: Box::new(err),
                });
            }
            Err(err) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Transcription attempt {} failed: {} (retrying in {:?})",
                    attempt,
                    err,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    fn server_error() -> TranscribeError {
        TranscribeError::Api {
            status: 500,
            message: "internal error".to_string(),
        }
    }

    #[test]
    fn test_delay_bounds_per_attempt() {
        let policy = RetryPolicy::default();
        for attempt in 1..=3 {
            let ceiling = policy.base_delay.as_secs_f64() * 2f64.powi(attempt as i32);
            for _ in 0..50 {
                let delay = policy.delay_for(attempt).as_secs_f64();
                assert!(delay >= ceiling * 0.5, "delay {} below floor", delay);
                assert!(delay < ceiling, "delay {} above ceiling", delay);
            }
        }
    }

    #[test]
    fn test_delay_grows_with_attempt() {
        let policy = RetryPolicy::default();
        // Jitter ranges never overlap between consecutive attempts
        assert!(policy.delay_for(2) > policy.delay_for(1));
        assert!(policy.delay_for(3) > policy.delay_for(2));
    }

    #[tokio::test]
    async fn test_succeeds_without_retry() {
        let calls = Cell::new(0u32);
        let result = retry_with_backoff(&fast_policy(), |_| {
            calls.set(calls.get() + 1);
            async { Ok::<_, TranscribeError>("text") }
        })
        .await;

        assert_eq!(result.unwrap(), "text");
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let result = retry_with_backoff(&fast_policy(), |attempt| async move {
            if attempt < 2 {
                Err(server_error())
            } else {
                Ok("recovered")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
    }

    #[tokio::test]
    async fn test_exhausts_budget_and_reports_attempts() {
        let calls = Cell::new(0u32);
        let result: Result<String, _> = retry_with_backoff(&fast_policy(), |_| {
            calls.set(calls.get() + 1);
            async { Err(server_error()) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls.get(), 3);
        assert!(matches!(
            err,
            TranscribeError::RetriesExhausted { attempts: 3, .. }
        ));
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_terminal_error_fails_fast() {
        let calls = Cell::new(0u32);
        let result: Result<String, _> = retry_with_backoff(&fast_policy(), |_| {
            calls.set(calls.get() + 1);
            async { Err(TranscribeError::MissingFile(PathBuf::from("/nope.mp3"))) }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result.unwrap_err(), TranscribeError::MissingFile(_)));
    }
}
