//! Embedding configuration.

use std::time::Duration;

use apt_core::RetryConfig;
use apt_settings::{AptSettings, EmbeddingSettings};
use serde::{Deserialize, Serialize};

/// Configuration for the embedding gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Embedding model identifier.
    pub model: String,
    /// Environment variable that holds the bearer token.
    pub api_key_env: String,
    /// Output dimensions (after Matryoshka truncation).
    pub dimensions: usize,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry policy for transient failures.
    pub retry: RetryConfig,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from_settings(&EmbeddingSettings::default(), &RetryConfig::default())
    }
}

impl EmbeddingConfig {
    /// Create config from the embedding and retry settings sections.
    pub fn from_settings(s: &EmbeddingSettings, retry: &RetryConfig) -> Self {
        Self {
            base_url: s.base_url.clone(),
            model: s.model.clone(),
            api_key_env: s.api_key_env.clone(),
            dimensions: s.dimensions,
            timeout_ms: s.timeout_ms,
            retry: retry.clone(),
        }
    }

    /// Create config from the root settings.
    pub fn from_app_settings(settings: &AptSettings) -> Self {
        Self::from_settings(&settings.embedding, &settings.retry)
    }

    /// `{base_url}/embeddings`, tolerating a trailing slash on the base.
    pub fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Read the bearer token from [`api_key_env`](Self::api_key_env).
    ///
    /// Returns `None` when the variable is unset or empty; local servers
    /// commonly run without a key.
    pub fn resolved_api_key(&self) -> Option<String> {
        if self.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}
