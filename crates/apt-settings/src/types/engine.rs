//! Matching engine tuning: search, builder, evolution, and scoring.

use serde::{Deserialize, Serialize};

/// Similarity search settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    /// Candidates scored per chunk on the exact path.
    pub chunk_size: usize,
    /// Pool size above which an approximate request is honored.
    pub approximate_threshold: usize,
    /// Number of sampled dimensions in the sign hash.
    pub lsh_bits: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            approximate_threshold: 1000,
            lsh_bits: 4,
        }
    }
}

/// User vector builder tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderSettings {
    /// Scale of a single response's adjustment.
    pub base_rate: f32,
    /// Extra multiplicative boost for significant dimensions.
    pub significant_boost: f32,
    /// Absolute deviation from the prototype that triggers correction.
    pub consistency_threshold: f32,
    /// Axis weight when the type holds the first pole (`L`, `A`, `E`, `F`).
    pub first_pole_weight: f32,
    /// Axis weight when the type holds the second pole (`S`, `R`, `M`, `C`).
    pub second_pole_weight: f32,
    /// Modifier for a question probing the pole the type holds.
    pub aligned_question_modifier: f32,
    /// Modifier for a question probing the opposite pole.
    pub opposed_question_modifier: f32,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            base_rate: 0.1,
            significant_boost: 0.05,
            consistency_threshold: 0.5,
            first_pole_weight: 1.2,
            second_pole_weight: 1.0,
            aligned_question_modifier: 1.2,
            opposed_question_modifier: 0.8,
        }
    }
}

/// Evolution engine tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvolutionSettings {
    /// Blend rate applied per like/skip action.
    pub learning_rate: f32,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.02,
        }
    }
}

/// Matching scorer defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchingSettings {
    /// Maximum results returned.
    pub limit: usize,
    /// Weight of vector similarity in the final score.
    pub personality_weight: f32,
    /// Weight of type compatibility in the final score.
    pub style_weight: f32,
    /// Penalize repeated styles and types among selected results.
    pub diversity_boost: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            limit: 10,
            personality_weight: 0.7,
            style_weight: 0.3,
            diversity_boost: true,
        }
    }
}
