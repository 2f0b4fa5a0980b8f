//! Engine configuration assembled from the settings sections it uses.

use apt_core::VECTOR_DIMENSIONS;
use apt_settings::{
    AptSettings, BuilderSettings, EvolutionSettings, MatchingSettings, SearchSettings,
};

/// Tuning for every engine component.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Vector dimension D.
    pub dimensions: usize,
    /// Similarity search.
    pub search: SearchSettings,
    /// User vector builder.
    pub builder: BuilderSettings,
    /// Evolution engine.
    pub evolution: EvolutionSettings,
    /// Matching scorer defaults.
    pub matching: MatchingSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimensions: VECTOR_DIMENSIONS,
            search: SearchSettings::default(),
            builder: BuilderSettings::default(),
            evolution: EvolutionSettings::default(),
            matching: MatchingSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Create config from the root settings.
    pub fn from_settings(settings: &AptSettings) -> Self {
        Self {
            dimensions: settings.embedding.dimensions,
            search: settings.search.clone(),
            builder: settings.builder.clone(),
            evolution: settings.evolution.clone(),
            matching: settings.matching.clone(),
        }
    }
}
