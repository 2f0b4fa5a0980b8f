//! # Embedding Retry
//!
//! Wraps any [`EmbeddingService`] with a per-attempt deadline and bounded
//! exponential backoff.
//!
//! The wrapper:
//! 1. Runs one attempt under [`tokio::time::timeout`]
//! 2. Returns immediately on success or on a non-retryable error
//! 3. Otherwise waits `max(backoff, Retry-After)` and tries again, with
//!    Retry-After capped at [`RETRY_AFTER_CAP_FACTOR`] times `max_delay_ms`
//! 4. After the last allowed attempt, returns
//!    [`EmbeddingError::RetriesExhausted`] carrying the final error
//!
//! Nothing is cached between calls.

use std::sync::Arc;
use std::time::Duration;

use apt_core::RetryConfig;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::errors::{EmbeddingError, Result};
use crate::service::EmbeddingService;

/// Longest honored Retry-After, as a multiple of `max_delay_ms`.
pub const RETRY_AFTER_CAP_FACTOR: u64 = 4;

/// Retry decorator for an embedding service.
pub struct RetryingEmbeddingService {
    inner: Arc<dyn EmbeddingService>,
    retry: RetryConfig,
    attempt_timeout: Duration,
}

impl RetryingEmbeddingService {
    /// Wrap `inner` with the given policy and per-attempt deadline.
    pub fn new(inner: Arc<dyn EmbeddingService>, retry: RetryConfig, attempt_timeout: Duration) -> Self {
        Self {
            inner,
            retry,
            attempt_timeout,
        }
    }

    /// Wrap `inner` using the retry policy and timeout from `config`.
    pub fn from_config(inner: Arc<dyn EmbeddingService>, config: &EmbeddingConfig) -> Self {
        Self::new(inner, config.retry.clone(), config.timeout())
    }

    async fn attempt(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match tokio::time::timeout(self.attempt_timeout, self.inner.embed(texts)).await {
            Ok(result) => result,
            Err(_) => Err(EmbeddingError::Timeout {
                timeout_ms: self.attempt_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl EmbeddingService for RetryingEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let err = match self.attempt(texts).await {
                Ok(vectors) => {
                    if attempt > 1 {
                        debug!(attempt, "embedding succeeded after retry");
                    }
                    return Ok(vectors);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                metrics::counter!("embedding_failures_total", "category" => err.category())
                    .increment(1);
                return Err(err);
            }
            if attempt >= max_attempts {
                metrics::counter!("embedding_failures_total", "category" => "exhausted")
                    .increment(1);
                warn!(attempts = attempt, error = %err, "embedding retries exhausted");
                return Err(EmbeddingError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let backoff_ms = self.retry.delay_for(attempt, rand::random::<f64>());
            // Respect Retry-After if available (use the larger value)
            let retry_after_cap = self.retry.max_delay_ms.saturating_mul(RETRY_AFTER_CAP_FACTOR);
            let delay_ms = err
                .retry_after_ms()
                .map_or(backoff_ms, |ra| backoff_ms.max(ra.min(retry_after_cap)));

            metrics::counter!("embedding_retries_total", "category" => err.category())
                .increment(1);
            warn!(
                attempt,
                max_attempts,
                delay_ms,
                category = err.category(),
                error = %err,
                "embedding attempt failed, retrying"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
