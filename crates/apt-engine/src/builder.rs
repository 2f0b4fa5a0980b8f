//! User vector builder.
//!
//! Starts from the type's prototype and scales each axis's dimension range
//! by the quiz answers on that axis:
//!
//! ```text
//! adjustment = (weight - 1) * base_rate * type_weight * question_modifier
//! v[d] *= 1 + adjustment            for d in axis range
//! v[d] *= 1 + significant_boost     for d in the type's significant half
//! ```
//!
//! Dimensions that end up far from the prototype are blended back, the
//! result is normalized, and the guardrail keeps it within reach of the
//! prototype.

use std::cmp::Ordering;
use std::ops::Range;

use apt_core::{AXIS_SEGMENT_WIDTH, Axis, PersonalityType, QuestionType, QuizResponse};
use apt_embeddings::normalize::is_finite;
use apt_settings::BuilderSettings;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::guardrail;
use crate::prototypes::PrototypeSet;

/// Share of the adjusted value kept when a dimension is corrected.
const CONSISTENCY_KEEP: f32 = 0.8;

/// The half of `axis`'s range that is significant for `personality`.
///
/// First-pole types (`L`, `A`, `E`, `F`) own the lower half, second-pole
/// types the upper half.
pub fn significant_range(axis: Axis, personality: PersonalityType) -> Range<usize> {
    let range = axis.dimension_range();
    let half = AXIS_SEGMENT_WIDTH / 2;
    if personality.pole(axis).is_first() {
        range.start..range.start + half
    } else {
        range.start + half..range.end
    }
}

/// Builds user vectors from quiz responses.
#[derive(Clone, Debug, Default)]
pub struct UserVectorBuilder {
    settings: BuilderSettings,
}

impl UserVectorBuilder {
    /// Create a builder with the given tuning.
    pub fn new(settings: BuilderSettings) -> Self {
        Self { settings }
    }

    /// Axis weight: heavier when the type holds the axis's first pole.
    pub fn type_weight(&self, axis: Axis, personality: PersonalityType) -> f32 {
        if personality.pole(axis).is_first() {
            self.settings.first_pole_weight
        } else {
            self.settings.second_pole_weight
        }
    }

    /// Modifier for a question on `axis`: aligned, opposed, or neutral.
    pub fn question_modifier(
        &self,
        question: QuestionType,
        axis: Axis,
        personality: PersonalityType,
    ) -> f32 {
        match question.pole() {
            Some(pole) if pole.axis() == axis => {
                if personality.has_pole(pole) {
                    self.settings.aligned_question_modifier
                } else {
                    self.settings.opposed_question_modifier
                }
            }
            _ => 1.0,
        }
    }

    /// Build a user vector for a type code.
    ///
    /// Fails with [`EngineError::InvalidType`](crate::EngineError::InvalidType)
    /// when the code is not one of the 16 types.
    pub fn build_for_code(
        &self,
        prototypes: &PrototypeSet,
        responses: &[QuizResponse],
        code: &str,
    ) -> Result<Vec<f32>> {
        let personality = PersonalityType::parse(code)?;
        Ok(self.build(prototypes, responses, personality))
    }

    /// Build a user vector for `personality`. Deterministic: any
    /// permutation of `responses` yields a bit-identical vector.
    pub fn build(
        &self,
        prototypes: &PrototypeSet,
        responses: &[QuizResponse],
        personality: PersonalityType,
    ) -> Vec<f32> {
        let prototype = prototypes.get(personality);
        let mut vector = prototype.to_vec();

        let mut ordered: Vec<(Axis, &QuizResponse)> = responses
            .iter()
            .filter_map(|response| {
                let Some(axis) = response.resolved_axis() else {
                    debug!(axis = %response.axis, "skipping response on unknown axis");
                    return None;
                };
                if !response.weight.is_finite() {
                    warn!(axis = %axis, "skipping response with non-finite weight");
                    return None;
                }
                Some((axis, response))
            })
            .collect();
        // Same-axis scaling does not commute bit-for-bit in f32
        ordered.sort_by(|(_, a), (_, b)| canonical_order(a, b));

        let significant_factor = 1.0 + self.settings.significant_boost;
        for (axis, response) in ordered {
            let adjustment = (response.weight - 1.0)
                * self.settings.base_rate
                * self.type_weight(axis, personality)
                * self.question_modifier(response.question_type, axis, personality);
            if !adjustment.is_finite() {
                continue;
            }
            let factor = 1.0 + adjustment;
            let significant = significant_range(axis, personality);
            for d in axis.dimension_range() {
                vector[d] *= factor;
                if significant.contains(&d) {
                    vector[d] *= significant_factor;
                }
            }
        }

        let threshold = self.settings.consistency_threshold;
        let mut corrected = 0usize;
        for (x, p) in vector.iter_mut().zip(prototype) {
            if (*x - p).abs() > threshold {
                *x = CONSISTENCY_KEEP * *x + (1.0 - CONSISTENCY_KEEP) * p;
                corrected += 1;
            }
        }
        if corrected > 0 {
            debug!(%personality, corrected, "consistency correction applied");
        }
        if !is_finite(&vector) {
            warn!(%personality, "quiz adjustments overflowed, falling back to prototype");
            vector = prototype.to_vec();
        }

        guardrail::enforce(vector, prototype, "builder")
    }
}

/// Canonical application order: axis, then question type, then weight.
fn canonical_order(a: &QuizResponse, b: &QuizResponse) -> Ordering {
    let axis_key = |r: &QuizResponse| r.resolved_axis().map(Axis::ordinal);
    axis_key(a)
        .cmp(&axis_key(b))
        .then_with(|| a.question_type.cmp(&b.question_type))
        .then_with(|| a.weight.total_cmp(&b.weight))
}
