//! Nearest-prototype classification of a user vector.

use apt_core::PersonalityType;
use apt_embeddings::normalize::cosine_similarity;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, check_dimension};
use crate::prototypes::PrototypeSet;
use crate::scorer::percent_score;

/// Alternatives reported beside the primary type.
pub const ALTERNATIVE_COUNT: usize = 3;

/// A type and its percent score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeScore {
    /// The type.
    pub personality_type: PersonalityType,
    /// `round(max(similarity, 0) * 100)`.
    pub score: u32,
}

/// Closest type and runners-up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Closest prototype.
    pub primary_type: PersonalityType,
    /// Percent score of the closest prototype.
    pub primary_score: u32,
    /// Next closest prototypes, best first.
    pub alternatives: Vec<TypeScore>,
}

/// Classify `vector` against every prototype.
///
/// Ranking uses raw similarity; equal similarities keep type index order.
pub fn classify(prototypes: &PrototypeSet, vector: &[f32]) -> Result<Classification> {
    check_dimension(prototypes.dimensions(), vector.len())?;

    let mut ranked: Vec<(PersonalityType, f32)> = prototypes
        .iter()
        .map(|(personality, prototype)| (personality, cosine_similarity(vector, prototype)))
        .collect();
    ranked.sort_by(|(ta, sa), (tb, sb)| sb.total_cmp(sa).then(ta.index().cmp(&tb.index())));

    let scores: Vec<TypeScore> = ranked
        .into_iter()
        .map(|(personality_type, similarity)| TypeScore {
            personality_type,
            score: percent_score(similarity),
        })
        .collect();
    // A prototype set always holds all 16 types
    let primary = scores[0];
    Ok(Classification {
        primary_type: primary.personality_type,
        primary_score: primary.score,
        alternatives: scores[1..=ALTERNATIVE_COUNT].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use apt_embeddings::normalize::normalized;
    use assert_matches::assert_matches;

    const DIMS: usize = 64;

    fn prototypes() -> PrototypeSet {
        let vectors = PersonalityType::ALL.iter().map(|t| {
            let mut v = vec![0.0; DIMS];
            v[t.index()] = 1.0;
            (*t, v)
        });
        PrototypeSet::from_vectors(vectors, DIMS).unwrap()
    }

    #[test]
    fn prototype_classifies_as_itself() {
        let set = prototypes();
        for t in PersonalityType::ALL {
            let c = classify(&set, set.get(t)).unwrap();
            assert_eq!(c.primary_type, t);
            assert_eq!(c.primary_score, 100);
            assert_eq!(c.alternatives.len(), 3);
        }
    }

    #[test]
    fn alternatives_are_ordered() {
        let set = prototypes();
        let mut v = vec![0.0; DIMS];
        v[5] = 0.9;
        v[2] = 0.5;
        v[9] = 0.3;
        let c = classify(&set, &normalized(&v)).unwrap();
        let codes: Vec<usize> = c.alternatives.iter().map(|a| a.personality_type.index()).collect();
        assert_eq!(c.primary_type.index(), 5);
        assert_eq!(codes[..2], [2, 9]);
        // remaining types tie at 0 and keep index order
        assert_eq!(codes[2], 0);
        assert_eq!(c.alternatives[2].score, 0);
    }

    #[test]
    fn wrong_dimension_fails() {
        assert_matches!(
            classify(&prototypes(), &[1.0; 8]),
            Err(EngineError::DimensionMismatch {
                expected: 64,
                actual: 8
            })
        );
    }

    #[test]
    fn json_shape() {
        let set = prototypes();
        let c = classify(&set, set.get(PersonalityType::ALL[0])).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["primaryType"], "LAEF");
        assert!(json["alternatives"][0].get("personalityType").is_some());
    }
}
