//! Embedding gateway settings.

use apt_core::VECTOR_DIMENSIONS;
use serde::{Deserialize, Serialize};

/// Connection and model settings for the external embedding service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// Base URL of an OpenAI-compatible API (without `/embeddings`).
    pub base_url: String,
    /// Embedding model identifier.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Output dimensions requested from the model (after truncation).
    pub dimensions: usize,
    /// Per-attempt request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            dimensions: VECTOR_DIMENSIONS,
            timeout_ms: 15_000,
        }
    }
}
