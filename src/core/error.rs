//! Error taxonomy for upstream market data access

use thiserror::Error;

/// Failure of a market data or conversion request.
///
/// `Validation` means the request itself is wrong (unknown symbol, bad
/// interval, unsupported currency) and is never retried. The remaining
/// variants describe upstream or network trouble that survived the retry
/// budget.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{0}")]
    Transport(String),
}

impl UpstreamError {
    pub fn is_validation(&self) -> bool {
        matches!(self, UpstreamError::Validation(_))
    }

    /// Prefixes the message with request context, keeping the variant.
    pub fn context(self, prefix: &str) -> Self {
        match self {
            UpstreamError::Validation(msg) => UpstreamError::Validation(msg),
            UpstreamError::Timeout(msg) => UpstreamError::Timeout(format!("{prefix}: {msg}")),
            UpstreamError::RateLimited(msg) => {
                UpstreamError::RateLimited(format!("{prefix}: {msg}"))
            }
            UpstreamError::Transport(msg) => UpstreamError::Transport(format!("{prefix}: {msg}")),
        }
    }
}

pub type Result<T, E = UpstreamError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_validation_message() {
        let err = UpstreamError::Validation("Invalid symbol".to_string()).context("BTCUSDT");
        assert_eq!(err.to_string(), "Invalid symbol");
        assert!(err.is_validation());
    }

    #[test]
    fn test_context_prefixes_transport_errors() {
        let err = UpstreamError::RateLimited("Rate limit exceeded".to_string())
            .context("Failed to fetch price for BTCUSDT");
        assert_eq!(
            err.to_string(),
            "Failed to fetch price for BTCUSDT: Rate limit exceeded"
        );
        assert!(matches!(err, UpstreamError::RateLimited(_)));
    }
}
