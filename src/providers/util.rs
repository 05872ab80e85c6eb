use crate::core::error::UpstreamError;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Outcome of a single failed request attempt, before retry classification.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("undecodable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AttemptError::Timeout(err.to_string())
        } else if err.is_decode() {
            AttemptError::Decode(err.to_string())
        } else {
            AttemptError::Connection(err.to_string())
        }
    }
}

impl AttemptError {
    /// Error to surface now, or `None` when another attempt may succeed.
    fn terminal(self, attempt: usize, last_attempt: bool) -> Option<UpstreamError> {
        match self {
            AttemptError::Timeout(_) if !last_attempt => None,
            AttemptError::Timeout(_) => Some(UpstreamError::Timeout(format!(
                "Request timeout after {attempt} attempts"
            ))),
            AttemptError::Status { status, .. } if status == StatusCode::TOO_MANY_REQUESTS => {
                last_attempt.then(|| UpstreamError::RateLimited("Rate limit exceeded".to_string()))
            }
            AttemptError::Status { status, body } if status.is_client_error() => Some(
                UpstreamError::Validation(format!("Invalid symbol or parameters: {body}")),
            ),
            AttemptError::Status { status, .. } => {
                Some(UpstreamError::Transport(format!("HTTP error: {status}")))
            }
            AttemptError::Connection(_) if !last_attempt => None,
            AttemptError::Connection(msg) => {
                Some(UpstreamError::Transport(format!("Request failed: {msg}")))
            }
            AttemptError::Decode(msg) => Some(UpstreamError::Transport(format!(
                "Invalid response from upstream: {msg}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total runs, including the first one.
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Wait before running attempt `next_attempt` (1-indexed).
    pub fn backoff(&self, next_attempt: usize) -> Duration {
        self.base_delay * next_attempt as u32
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Retries an async operation according to `policy`
///
/// Timeouts, throttling (HTTP 429) and connection failures are retried with a
/// linearly growing, non-blocking delay. Client errors surface immediately as
/// `Validation`, other HTTP errors and undecodable bodies as `Transport`.
pub async fn with_retry<F, Fut, T>(mut operation: F, policy: &RetryPolicy) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let err = match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => err,
        };

        let reason = err.to_string();
        if let Some(terminal) = err.terminal(attempt, attempt >= max_attempts) {
            debug!("Attempt {}/{} failed: {}. Giving up", attempt, max_attempts, reason);
            return Err(terminal);
        }

        let delay = policy.backoff(attempt + 1);
        debug!(
            "Attempt {}/{} failed: {}. Retrying in {:?}...",
            attempt, max_attempts, reason, delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
