//! Embedding controller: owns the service and embeds content in batches.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::errors::{EmbeddingError, Result};
use crate::http_service::HttpEmbeddingService;
use crate::retry::RetryingEmbeddingService;
use crate::service::EmbeddingService;
use crate::text::{ArtistDescription, ArtworkDescription, build_artist_text, build_artwork_text};

/// One piece of content to embed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedItem {
    /// Content identifier.
    pub id: String,
    /// Text to embed.
    pub text: String,
}

impl EmbedItem {
    /// Create an item.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl From<&ArtworkDescription> for EmbedItem {
    fn from(artwork: &ArtworkDescription) -> Self {
        Self::new(artwork.id.clone(), build_artwork_text(artwork))
    }
}

impl From<&ArtistDescription> for EmbedItem {
    fn from(artist: &ArtistDescription) -> Self {
        Self::new(artist.id.clone(), build_artist_text(artist))
    }
}

/// Outcome of a batch embedding run.
///
/// Every input id lands in exactly one of the three lists.
#[derive(Debug, Default)]
pub struct BatchEmbedResult {
    /// Successfully embedded items, in input order.
    pub embedded: Vec<(String, Vec<f32>)>,
    /// Items whose embedding failed, with the error.
    pub failures: Vec<(String, EmbeddingError)>,
    /// Items skipped because their text was empty.
    pub skipped: Vec<String>,
}

/// Owns the embedding service used for content.
pub struct EmbeddingController {
    service: Option<Arc<dyn EmbeddingService>>,
    config: EmbeddingConfig,
}

impl EmbeddingController {
    /// Create a new controller with the given config and no service.
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            service: None,
            config,
        }
    }

    /// Create a controller backed by the HTTP client wrapped in retries.
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let http: Arc<dyn EmbeddingService> = Arc::new(HttpEmbeddingService::new(&config)?);
        let service = Arc::new(RetryingEmbeddingService::from_config(http, &config));
        let mut controller = Self::new(config);
        controller.set_service(service);
        Ok(controller)
    }

    /// Set the embedding service.
    pub fn set_service(&mut self, service: Arc<dyn EmbeddingService>) {
        self.service = Some(service);
    }

    /// The configured service, if any.
    pub fn service(&self) -> Option<Arc<dyn EmbeddingService>> {
        self.service.clone()
    }

    /// Whether a ready service is configured.
    pub fn is_ready(&self) -> bool {
        self.service.as_ref().is_some_and(|s| s.is_ready())
    }

    /// Get the config.
    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    fn ready_service(&self) -> Result<&Arc<dyn EmbeddingService>> {
        let service = self.service.as_ref().ok_or(EmbeddingError::NotReady)?;
        if !service.is_ready() {
            return Err(EmbeddingError::NotReady);
        }
        Ok(service)
    }

    /// Embed one text. Empty text yields `Ok(None)`.
    pub async fn embed_text(&self, text: &str) -> Result<Option<Vec<f32>>> {
        let service = self.ready_service()?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        service.embed_single(text).await.map(Some)
    }

    /// Embed content items one at a time.
    ///
    /// An item's failure is recorded against its id and never aborts the
    /// batch. Only a missing or unready service fails the whole call.
    pub async fn embed_batch(&self, items: Vec<EmbedItem>) -> Result<BatchEmbedResult> {
        let service = self.ready_service()?;
        let mut result = BatchEmbedResult::default();

        for item in items {
            if item.text.trim().is_empty() {
                debug!(id = %item.id, "skipping embedding: empty text");
                result.skipped.push(item.id);
                continue;
            }
            match service.embed_single(&item.text).await {
                Ok(vector) if vector.len() == service.dimensions() => {
                    result.embedded.push((item.id, vector));
                }
                Ok(vector) => {
                    let err = EmbeddingError::InvalidResponse(format!(
                        "expected {} dimensions, got {}",
                        service.dimensions(),
                        vector.len()
                    ));
                    warn!(id = %item.id, error = %err, "batch embed failed");
                    result.failures.push((item.id, err));
                }
                Err(e) => {
                    warn!(id = %item.id, error = %e, "batch embed failed");
                    result.failures.push((item.id, e));
                }
            }
        }

        debug!(
            embedded = result.embedded.len(),
            failed = result.failures.len(),
            skipped = result.skipped.len(),
            "batch embedding complete"
        );
        Ok(result)
    }

    /// Embed artwork descriptions.
    pub async fn embed_artworks(&self, artworks: &[ArtworkDescription]) -> Result<BatchEmbedResult> {
        self.embed_batch(artworks.iter().map(EmbedItem::from).collect())
            .await
    }

    /// Embed artist descriptions.
    pub async fn embed_artists(&self, artists: &[ArtistDescription]) -> Result<BatchEmbedResult> {
        self.embed_batch(artists.iter().map(EmbedItem::from).collect())
            .await
    }
}
