//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a partial
//! JSON document deserializes with production defaults for missing fields.

mod embedding;
mod engine;

pub use embedding::*;
pub use engine::*;

use apt_core::RetryConfig;
use serde::{Deserialize, Serialize};

/// Root settings for the APT matching engine.
///
/// Loaded from `~/.apt/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// ```json
/// {
///   "embedding": { "model": "text-embedding-3-large" },
///   "search": { "approximateThreshold": 5000 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AptSettings {
    /// Settings schema version.
    pub version: String,
    /// Embedding gateway settings.
    pub embedding: EmbeddingSettings,
    /// Retry policy for the embedding gateway.
    pub retry: RetryConfig,
    /// Similarity search settings.
    pub search: SearchSettings,
    /// User vector builder tuning.
    pub builder: BuilderSettings,
    /// Evolution engine tuning.
    pub evolution: EvolutionSettings,
    /// Matching scorer defaults.
    pub matching: MatchingSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for AptSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            embedding: EmbeddingSettings::default(),
            retry: RetryConfig::default(),
            search: SearchSettings::default(),
            builder: BuilderSettings::default(),
            evolution: EvolutionSettings::default(),
            matching: MatchingSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
