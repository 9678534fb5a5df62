//! Gateway error taxonomy
//!
//! Every failure from the remote generation capability is normalized
//! into one of these variants. Rate limiting is the only transient
//! kind; the gateway itself never retries, callers decide.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Capacity exhausted upstream; retry after the given delay
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// The capability returned an error payload
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The capability answered but the payload was unusable
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether the caller should retry with backoff
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_limited_is_transient() {
        assert!(
            LlmError::RateLimited {
                retry_after: Duration::from_secs(60)
            }
            .is_transient()
        );
        assert!(
            !LlmError::Api {
                status: 500,
                message: "boom".to_string()
            }
            .is_transient()
        );
        assert!(!LlmError::InvalidResponse("empty".to_string()).is_transient());
    }
}
