//! Type-to-type compatibility.

use apt_core::PersonalityType;

/// Score for identical types.
pub const IDENTICAL_SCORE: f32 = 0.9;

/// Score when the candidate's type is missing or unparsable.
pub const UNKNOWN_SCORE: f32 = 0.5;

const MATCHING_AXIS_SCORE: f32 = 0.2;
const DIFFERING_AXIS_SCORE: f32 = 0.1;
const SYNERGY_BONUS: f32 = 0.2;

/// Pairs that differ only on Lone/Social. Unordered.
pub const SYNERGY_PAIRS: [(&str, &str); 8] = [
    ("LAEF", "SAEF"),
    ("LAEC", "SAEC"),
    ("LAMF", "SAMF"),
    ("LAMC", "SAMC"),
    ("LREF", "SREF"),
    ("LREC", "SREC"),
    ("LRMF", "SRMF"),
    ("LRMC", "SRMC"),
];

/// Whether `a` and `b` appear together in [`SYNERGY_PAIRS`].
pub fn is_synergy_pair(a: PersonalityType, b: PersonalityType) -> bool {
    let (a, b) = (a.code(), b.code());
    SYNERGY_PAIRS
        .iter()
        .any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
}

/// Compatibility in `[0, 1]` between two known types.
pub fn compatibility(user: PersonalityType, candidate: PersonalityType) -> f32 {
    if user == candidate {
        return IDENTICAL_SCORE;
    }
    let matching = user.matching_axes(candidate);
    let differing = 4 - matching;
    let mut score =
        MATCHING_AXIS_SCORE * matching as f32 + DIFFERING_AXIS_SCORE * differing as f32;
    if is_synergy_pair(user, candidate) {
        score += SYNERGY_BONUS;
    }
    score.min(1.0)
}

/// Compatibility against a candidate whose type may be missing or invalid.
pub fn type_compatibility(user: PersonalityType, candidate: Option<&str>) -> f32 {
    candidate
        .and_then(|code| PersonalityType::parse(code).ok())
        .map_or(UNKNOWN_SCORE, |candidate| compatibility(user, candidate))
}
