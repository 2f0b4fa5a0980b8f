//! Evolution engine: nudges a user vector from like/skip behavior.
//!
//! Each action moves the vector a small step toward (like) or away from
//! (skip) the content's vector. The result is held near the type's
//! prototype by the same guardrail the builder uses.
//!
//! Evolution reads and replaces a user's vector, so callers must serialize
//! evolution per user.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use apt_core::PersonalityType;
use apt_embeddings::normalize::{l2_normalize, normalized};
use apt_settings::EvolutionSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{EngineError, Result, check_dimension};
use crate::guardrail;
use crate::prototypes::PrototypeSet;

/// What the user did with a piece of content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Move toward the content.
    Like,
    /// Move away from the content.
    Skip,
}

/// One like/skip event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    /// Content the action refers to.
    pub content_id: String,
    /// Like or skip.
    pub kind: ActionKind,
}

impl UserAction {
    /// A like of `content_id`.
    pub fn like(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            kind: ActionKind::Like,
        }
    }

    /// A skip of `content_id`.
    pub fn skip(content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            kind: ActionKind::Skip,
        }
    }
}

/// Lookup of content vectors by id.
pub trait ContentVectorSource {
    /// The vector for `content_id`, if known.
    fn content_vector(&self, content_id: &str) -> Option<&[f32]>;
}

impl<S: BuildHasher> ContentVectorSource for HashMap<String, Vec<f32>, S> {
    fn content_vector(&self, content_id: &str) -> Option<&[f32]> {
        self.get(content_id).map(Vec::as_slice)
    }
}

impl ContentVectorSource for BTreeMap<String, Vec<f32>> {
    fn content_vector(&self, content_id: &str) -> Option<&[f32]> {
        self.get(content_id).map(Vec::as_slice)
    }
}

/// Applies like/skip actions to user vectors.
#[derive(Clone, Debug, Default)]
pub struct EvolutionEngine {
    settings: EvolutionSettings,
}

impl EvolutionEngine {
    /// Create an engine with the given learning rate.
    pub fn new(settings: EvolutionSettings) -> Self {
        Self { settings }
    }

    /// Learning rate `r`.
    pub fn learning_rate(&self) -> f32 {
        self.settings.learning_rate
    }

    /// Apply `actions` in order to `current` and return the new vector.
    ///
    /// Every referenced content vector is resolved before any arithmetic,
    /// so a missing or mis-sized vector leaves nothing half-applied.
    pub fn evolve(
        &self,
        prototypes: &PrototypeSet,
        current: &[f32],
        actions: &[UserAction],
        personality: PersonalityType,
        source: &(dyn ContentVectorSource + Sync),
    ) -> Result<Vec<f32>> {
        check_dimension(prototypes.dimensions(), current.len())?;

        let steps = actions
            .iter()
            .map(|action| {
                let content = source.content_vector(&action.content_id).ok_or_else(|| {
                    EngineError::MissingContentVector {
                        content_id: action.content_id.clone(),
                    }
                })?;
                check_dimension(current.len(), content.len())?;
                Ok((action.kind, content))
            })
            .collect::<Result<Vec<_>>>()?;

        if steps.is_empty() {
            return Ok(normalized(current));
        }

        let r = self.settings.learning_rate;
        let mut vector = current.to_vec();
        for (kind, content) in &steps {
            let (keep, toward) = match kind {
                ActionKind::Like => (1.0 - r, r),
                ActionKind::Skip => (1.0 + r, -r),
            };
            for (v, c) in vector.iter_mut().zip(content.iter()) {
                *v = keep * *v + toward * c;
            }
            l2_normalize(&mut vector);
        }

        debug!(
            personality = %personality,
            actions = steps.len(),
            learning_rate = r,
            "user vector evolved"
        );
        Ok(guardrail::enforce(
            vector,
            prototypes.get(personality),
            "evolution",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apt_embeddings::normalize::{cosine_similarity, l2_norm};
    use assert_matches::assert_matches;

    const DIMS: usize = 64;

    fn prototypes() -> PrototypeSet {
        let vectors = PersonalityType::ALL.iter().map(|t| {
            let mut v = vec![0.1; DIMS];
            v[t.index()] = 1.0;
            (*t, v)
        });
        PrototypeSet::from_vectors(vectors, DIMS).unwrap()
    }

    fn laef() -> PersonalityType {
        PersonalityType::parse("LAEF").unwrap()
    }

    fn axis_vector(index: usize) -> Vec<f32> {
        let mut v = vec![0.0; DIMS];
        v[index] = 1.0;
        v
    }

    #[test]
    fn empty_actions_only_normalize() {
        let set = prototypes();
        let current = vec![3.0; DIMS];
        let content: HashMap<String, Vec<f32>> = HashMap::new();
        let out = EvolutionEngine::default()
            .evolve(&set, &current, &[], laef(), &content)
            .unwrap();
        assert_eq!(out, normalized(&current));
    }

    #[test]
    fn like_moves_toward_and_skip_moves_away() {
        let set = prototypes();
        let current = set.get(laef()).to_vec();
        let content = HashMap::from([("art-1".to_string(), axis_vector(40))]);
        let engine = EvolutionEngine::default();

        let before = cosine_similarity(&current, &content["art-1"]);
        let liked = engine
            .evolve(&set, &current, &[UserAction::like("art-1")], laef(), &content)
            .unwrap();
        let skipped = engine
            .evolve(&set, &current, &[UserAction::skip("art-1")], laef(), &content)
            .unwrap();

        assert!(cosine_similarity(&liked, &content["art-1"]) > before);
        assert!(cosine_similarity(&skipped, &content["art-1"]) < before);
        assert!((l2_norm(&liked) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn missing_content_fails_before_any_step() {
        let set = prototypes();
        let content = BTreeMap::from([("known".to_string(), axis_vector(3))]);
        let actions = [UserAction::like("known"), UserAction::skip("unknown")];
        assert_matches!(
            EvolutionEngine::default().evolve(&set, set.get(laef()), &actions, laef(), &content),
            Err(EngineError::MissingContentVector { content_id }) if content_id == "unknown"
        );
    }

    #[test]
    fn mis_sized_content_fails() {
        let set = prototypes();
        let content = HashMap::from([("short".to_string(), vec![1.0; 8])]);
        assert_matches!(
            EvolutionEngine::default().evolve(
                &set,
                set.get(laef()),
                &[UserAction::like("short")],
                laef(),
                &content
            ),
            Err(EngineError::DimensionMismatch {
                expected: 64,
                actual: 8
            })
        );
    }

    #[test]
    fn mis_sized_current_fails() {
        let set = prototypes();
        let content: HashMap<String, Vec<f32>> = HashMap::new();
        assert_matches!(
            EvolutionEngine::default().evolve(&set, &[1.0; 3], &[], laef(), &content),
            Err(EngineError::DimensionMismatch { .. })
        );
    }

    #[test]
    fn long_drift_is_pulled_back_to_prototype() {
        let set = prototypes();
        let prototype = set.get(laef()).to_vec();
        let content = HashMap::from([("far".to_string(), axis_vector(40))]);
        let actions = vec![UserAction::like("far"); 500];
        let out = EvolutionEngine::new(EvolutionSettings { learning_rate: 0.2 })
            .evolve(&set, &prototype, &actions, laef(), &content)
            .unwrap();
        assert!(cosine_similarity(&out, &prototype) >= 0.7);
    }

    #[test]
    fn action_json_shape() {
        let action: UserAction =
            serde_json::from_str(r#"{"contentId": "a1", "kind": "skip"}"#).unwrap();
        assert_eq!(action, UserAction::skip("a1"));
        let json = serde_json::to_value(UserAction::like("a2")).unwrap();
        assert_eq!(json["kind"], "like");
        assert_eq!(json["contentId"], "a2");
    }
}
