//! OpenAI-compatible HTTP embedding client.
//!
//! Sends `POST {base_url}/embeddings` with `{model, input, dimensions}` and
//! maps the response back to input order. Every returned vector is
//! Matryoshka-truncated to the configured dimension and L2-normalized, so
//! models that ignore the `dimensions` field still produce usable output.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::errors::{EmbeddingError, Result};
use crate::normalize::{is_finite, matryoshka_truncate};
use crate::service::EmbeddingService;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding service backed by an OpenAI-compatible REST API.
pub struct HttpEmbeddingService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    api_key: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for HttpEmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingService")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpEmbeddingService {
    /// Create a client from config. The API key is read from the
    /// configured environment variable.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        if config.dimensions == 0 {
            return Err(EmbeddingError::Config("dimensions must be positive".into()));
        }
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::Config("model must not be empty".into()));
        }
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            api_key: config.resolved_api_key(),
            timeout: config.timeout(),
        })
    }

    /// Override the bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Request URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> EmbeddingError {
        if err.is_timeout() {
            EmbeddingError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            EmbeddingError::Http(err)
        }
    }

    fn collect_vectors(&self, response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
        let mut items = response.data;
        if items.len() != expected {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {expected} embeddings, got {}",
                items.len()
            )));
        }
        items.sort_by_key(|item| item.index);

        items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                if item.index != position {
                    return Err(EmbeddingError::InvalidResponse(format!(
                        "missing embedding for input {position}"
                    )));
                }
                if item.embedding.len() < self.dimensions {
                    return Err(EmbeddingError::InvalidResponse(format!(
                        "embedding {position} has {} dimensions, expected at least {}",
                        item.embedding.len(),
                        self.dimensions
                    )));
                }
                if !is_finite(&item.embedding) {
                    return Err(EmbeddingError::InvalidResponse(format!(
                        "embedding {position} contains non-finite values"
                    )));
                }
                Ok(matryoshka_truncate(&item.embedding, self.dimensions))
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingService for HttpEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        debug!(
            model = %self.model,
            count = texts.len(),
            dimensions = self.dimensions,
            "requesting embeddings"
        );

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(apt_core::retry::parse_retry_after_header)
                .unwrap_or(0);
            return Err(EmbeddingError::RateLimited { retry_after_ms });
        }
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: parse_api_error(&body_text, status.as_u16()),
                retryable: status.is_server_error(),
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;
        self.collect_vectors(parsed, texts.len())
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Extract the human-readable message from an error body.
fn parse_api_error(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| format!("HTTP {status}: {body}"))
}
