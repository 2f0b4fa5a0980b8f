//! Embedding error types.
//!
//! Errors carry enough structure for the retry wrapper to decide whether an
//! attempt may be repeated and how long to wait first.

use thiserror::Error;

/// Errors from embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// HTTP transport failed (connect, TLS, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The embedding API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Whether this error can be retried.
        retryable: bool,
    },

    /// Rate limited by the embedding API.
    #[error("Rate limited: retry after {retry_after_ms}ms")]
    RateLimited {
        /// Suggested retry delay in milliseconds.
        retry_after_ms: u64,
    },

    /// A single attempt exceeded its deadline.
    #[error("Embedding request timed out after {timeout_ms}ms")]
    Timeout {
        /// Deadline that was exceeded.
        timeout_ms: u64,
    },

    /// The API answered successfully but the payload is unusable.
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Service not ready (not configured or disabled).
    #[error("Embedding service not ready")]
    NotReady,

    /// Every allowed attempt failed with a retryable error.
    #[error("Embedding failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Attempts made, including the first.
        attempts: u32,
        /// The error from the final attempt.
        last: Box<EmbeddingError>,
    },
}

impl EmbeddingError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::RateLimited { .. } | Self::Timeout { .. } => true,
            Self::Api { retryable, .. } => *retryable,
            Self::InvalidResponse(_)
            | Self::Config(_)
            | Self::NotReady
            | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Server-suggested retry delay in milliseconds, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }

    /// Error category label for logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Api { .. } => "api",
            Self::RateLimited { .. } => "rate_limit",
            Self::Timeout { .. } => "timeout",
            Self::InvalidResponse(_) => "parse",
            Self::Config(_) => "config",
            Self::NotReady => "not_ready",
            Self::RetriesExhausted { .. } => "exhausted",
        }
    }
}

/// Result alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn error_display_variants() {
        let cases = vec![
            (
                EmbeddingError::Api {
                    status: 400,
                    message: "bad input".into(),
                    retryable: false,
                },
                "API error (400): bad input",
            ),
            (
                EmbeddingError::RateLimited {
                    retry_after_ms: 2000,
                },
                "Rate limited: retry after 2000ms",
            ),
            (
                EmbeddingError::Timeout { timeout_ms: 15_000 },
                "Embedding request timed out after 15000ms",
            ),
            (
                EmbeddingError::InvalidResponse("expected 2 items, got 1".into()),
                "Invalid embedding response: expected 2 items, got 1",
            ),
            (
                EmbeddingError::Config("missing field".into()),
                "Config error: missing field",
            ),
            (EmbeddingError::NotReady, "Embedding service not ready"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn retryable_classification() {
        assert!(EmbeddingError::RateLimited { retry_after_ms: 0 }.is_retryable());
        assert!(EmbeddingError::Timeout { timeout_ms: 1 }.is_retryable());
        assert!(
            EmbeddingError::Api {
                status: 503,
                message: String::new(),
                retryable: true
            }
            .is_retryable()
        );
        assert!(
            !EmbeddingError::Api {
                status: 401,
                message: String::new(),
                retryable: false
            }
            .is_retryable()
        );
        assert!(!EmbeddingError::InvalidResponse(String::new()).is_retryable());
        assert!(!EmbeddingError::NotReady.is_retryable());
    }

    #[test]
    fn exhausted_is_terminal_and_keeps_source() {
        let err = EmbeddingError::RetriesExhausted {
            attempts: 4,
            last: Box::new(EmbeddingError::Timeout { timeout_ms: 10 }),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.category(), "exhausted");
        assert!(err.to_string().contains("after 4 attempts"));
        assert!(err.source().is_none());
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        assert_eq!(
            EmbeddingError::RateLimited {
                retry_after_ms: 1500
            }
            .retry_after_ms(),
            Some(1500)
        );
        assert_eq!(EmbeddingError::NotReady.retry_after_ms(), None);
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EmbeddingError>();
    }
}
