//! Embedding service trait and mock implementation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::errors::{EmbeddingError, Result};
use crate::normalize::l2_normalize;

/// Trait for embedding text into vectors.
///
/// Implementations return one unit-length vector of [`dimensions`]
/// components per input text, in input order.
///
/// [`dimensions`]: EmbeddingService::dimensions
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text (default: calls `embed` with one item).
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty result".into()))
    }

    /// Whether the service can accept requests.
    fn is_ready(&self) -> bool;

    /// Output embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Mock embedding service for testing.
///
/// Generates deterministic embeddings by hashing input text with SHA-256,
/// using the hash bytes as seeds for the vector components. Failures can be
/// injected for retry and isolation tests.
pub struct MockEmbeddingService {
    dims: usize,
    ready: AtomicBool,
    pending_failures: AtomicU32,
    calls: AtomicUsize,
    poison: Option<String>,
}

impl MockEmbeddingService {
    /// Create a new mock service with the given dimensions.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            ready: AtomicBool::new(true),
            pending_failures: AtomicU32::new(0),
            calls: AtomicUsize::new(0),
            poison: None,
        }
    }

    /// Reject (non-retryably) any batch containing a text with `marker`.
    #[must_use]
    pub fn with_poison(mut self, marker: impl Into<String>) -> Self {
        self.poison = Some(marker.into());
        self
    }

    /// Set whether this mock is ready.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Fail the next `count` calls with a retryable 503.
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Number of `embed` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The vector this mock produces for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let hash = Sha256::digest(text.as_bytes());

        let mut v: Vec<f32> = (0..self.dims)
            .map(|i| {
                // Rehash per 32-dim block so long vectors do not repeat
                let block = i / hash.len();
                let byte = if block == 0 {
                    hash[i]
                } else {
                    let mut hasher = Sha256::new();
                    hasher.update(hash);
                    hasher.update((block as u64).to_le_bytes());
                    hasher.finalize()[i % hash.len()]
                };
                // Map byte to [-1, 1] range
                (f32::from(byte) / 127.5) - 1.0
            })
            .collect();

        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.is_ready() {
            return Err(EmbeddingError::NotReady);
        }
        let injected = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(EmbeddingError::Api {
                status: 503,
                message: "injected failure".into(),
                retryable: true,
            });
        }
        if let Some(marker) = &self.poison {
            if texts.iter().any(|t| t.contains(marker.as_str())) {
                return Err(EmbeddingError::Api {
                    status: 400,
                    message: format!("rejected input containing {marker:?}"),
                    retryable: false,
                });
            }
        }
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}
