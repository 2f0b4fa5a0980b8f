//! Matching scorer: ranked, explained artist and artwork matches.
//!
//! Artists are scored by blending vector similarity with type
//! compatibility, then selected greedily so the list is not dominated by
//! one style or type. Artworks are ranked by similarity alone through the
//! [`SimilarityEngine`].

use apt_core::PersonalityType;
use apt_settings::MatchingSettings;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compatibility::{is_synergy_pair, type_compatibility};
use crate::errors::Result;
use crate::similarity::{SearchStrategy, SimilarityEngine, similarity};

/// How many of the most recently selected results the diversity penalty
/// looks at.
const DIVERSITY_WINDOW: usize = 5;
const SAME_STYLE_PENALTY: f32 = 0.85;
const SAME_TYPE_PENALTY: f32 = 0.90;
const DIVERSITY_FLOOR: f32 = 0.5;

/// An artist to score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistCandidate {
    /// Entity id echoed on the result.
    pub id: String,
    /// Content vector.
    pub vector: Vec<f32>,
    /// Declared personality type code, if any.
    #[serde(default)]
    pub personality_type: Option<String>,
    /// Declared style, if any.
    #[serde(default)]
    pub style: Option<String>,
}

/// An artwork to rank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkCandidate {
    /// Entity id echoed on the result.
    pub id: String,
    /// Content vector.
    pub vector: Vec<f32>,
    /// Declared style, if any.
    #[serde(default)]
    pub style: Option<String>,
}

impl AsRef<[f32]> for ArtworkCandidate {
    fn as_ref(&self) -> &[f32] {
        &self.vector
    }
}

/// Artist matching options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchOptions {
    /// Maximum results.
    pub limit: usize,
    /// Apply the greedy diversity penalty.
    pub diversity_boost: bool,
    /// Weight of vector similarity.
    pub personality_weight: f32,
    /// Weight of type compatibility.
    pub style_weight: f32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::from(&MatchingSettings::default())
    }
}

impl From<&MatchingSettings> for MatchOptions {
    fn from(settings: &MatchingSettings) -> Self {
        Self {
            limit: settings.limit,
            diversity_boost: settings.diversity_boost,
            personality_weight: settings.personality_weight,
            style_weight: settings.style_weight,
        }
    }
}

/// One ranked match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Candidate id.
    pub entity_id: String,
    /// `round(max(similarity, 0) * 100)`.
    pub similarity_score: u32,
    /// Type compatibility in `[0, 1]`. Always `0` for artworks, which carry
    /// no type.
    pub compatibility_score: f32,
    /// Diversity factor in `[0.5, 1]`.
    pub diversity_score: f32,
    /// Score the list is ranked by.
    pub final_score: f32,
    /// Human-readable explanations.
    pub reasons: Vec<String>,
}

/// Artwork matches plus the search path that produced them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkMatches {
    /// Ranked matches.
    pub matches: Vec<MatchResult>,
    /// Search path actually taken.
    pub strategy_used: SearchStrategy,
}

/// Percent score shown to users.
pub fn percent_score(similarity: f32) -> u32 {
    (similarity.max(0.0) * 100.0).round() as u32
}

fn score_band(score: f32) -> Option<&'static str> {
    if score > 0.8 {
        Some("Excellent match for your taste")
    } else if score > 0.6 {
        Some("Strong match for your taste")
    } else if score > 0.4 {
        Some("Good match for your taste")
    } else {
        None
    }
}

fn same_label(a: Option<&str>, b: Option<&str>) -> bool {
    match (a.map(str::trim), b.map(str::trim)) {
        (Some(a), Some(b)) => !a.is_empty() && a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

struct Scored<'a> {
    index: usize,
    candidate: &'a ArtistCandidate,
    similarity: f32,
    compatibility: f32,
    base: f32,
}

fn diversity_factor(candidate: &ArtistCandidate, selected: &[(Scored<'_>, f32)]) -> f32 {
    let start = selected.len().saturating_sub(DIVERSITY_WINDOW);
    let factor = selected[start..].iter().fold(1.0, |factor, (picked, _)| {
        let mut factor = factor;
        if same_label(candidate.style.as_deref(), picked.candidate.style.as_deref()) {
            factor *= SAME_STYLE_PENALTY;
        }
        if same_label(
            candidate.personality_type.as_deref(),
            picked.candidate.personality_type.as_deref(),
        ) {
            factor *= SAME_TYPE_PENALTY;
        }
        factor
    });
    factor.max(DIVERSITY_FLOOR)
}

/// Highest effective score `base` can reach under any diversity factor.
fn score_ceiling(base: f32) -> f32 {
    if base >= 0.0 { base } else { base * DIVERSITY_FLOOR }
}

/// Greedy diversity selection over a pool sorted by base descending.
///
/// Each pick takes the candidate with the highest `base * factor`, ties to
/// the earlier pool position. The scan stops once no later candidate can
/// reach the current best, which keeps picks near the front of the pool.
fn select_diverse<'a>(mut pool: Vec<Scored<'a>>, limit: usize) -> Vec<(Scored<'a>, f32)> {
    let mut selected: Vec<(Scored<'a>, f32)> = Vec::with_capacity(limit);
    while selected.len() < limit {
        let mut best: Option<(usize, f32, f32)> = None;
        for (position, scored) in pool.iter().enumerate() {
            let ceiling = score_ceiling(scored.base);
            if best.is_some_and(|(_, _, best_score)| ceiling.total_cmp(&best_score).is_lt()) {
                break;
            }
            let factor = diversity_factor(scored.candidate, &selected);
            let effective = scored.base * factor;
            if best.is_none_or(|(_, _, best_score)| effective.total_cmp(&best_score).is_gt()) {
                best = Some((position, factor, effective));
            }
        }
        let Some((position, factor, _)) = best else {
            break;
        };
        selected.push((pool.remove(position), factor));
    }
    selected
}

fn artist_reasons(personality: PersonalityType, scored: &Scored<'_>, final_score: f32) -> Vec<String> {
    let mut reasons = Vec::new();
    if let Some(band) = score_band(final_score) {
        reasons.push(band.to_string());
    }
    let candidate_type = scored
        .candidate
        .personality_type
        .as_deref()
        .and_then(|code| PersonalityType::parse(code).ok());
    if let Some(candidate_type) = candidate_type {
        for pole in personality.shared_poles(candidate_type) {
            reasons.push(format!("Shares your {} perspective", pole.label()));
        }
        if is_synergy_pair(personality, candidate_type) {
            reasons.push(format!(
                "Complementary pairing: {personality} and {candidate_type}"
            ));
        }
        if candidate_type == personality {
            reasons.push("Same personality type".to_string());
        }
    }
    reasons
}

/// Scores and ranks artists and artworks for a user vector.
#[derive(Clone, Debug, Default)]
pub struct MatchingScorer {
    search: SimilarityEngine,
}

impl MatchingScorer {
    /// Create a scorer that ranks artworks through `search`.
    pub fn new(search: SimilarityEngine) -> Self {
        Self { search }
    }

    /// Rank `candidates` for a user of type `personality`.
    ///
    /// Results are sorted by final score descending, ties by input order.
    pub fn find_best_artist_matches(
        &self,
        user_vector: &[f32],
        personality: PersonalityType,
        candidates: &[ArtistCandidate],
        options: &MatchOptions,
    ) -> Result<Vec<MatchResult>> {
        let mut pool = candidates
            .par_iter()
            .enumerate()
            .map(|(index, candidate)| {
                let similarity = similarity(user_vector, &candidate.vector)?;
                let compatibility =
                    type_compatibility(personality, candidate.personality_type.as_deref());
                Ok(Scored {
                    index,
                    candidate,
                    similarity,
                    compatibility,
                    base: similarity * options.personality_weight
                        + compatibility * options.style_weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        pool.sort_by(|a, b| b.base.total_cmp(&a.base).then(a.index.cmp(&b.index)));

        let limit = options.limit.min(pool.len());
        let selected = if options.diversity_boost {
            select_diverse(pool, limit)
        } else {
            pool.into_iter().take(limit).map(|s| (s, 1.0)).collect()
        };

        let mut ranked: Vec<(usize, MatchResult)> = selected
            .into_iter()
            .map(|(scored, factor)| {
                let final_score = scored.base * factor;
                let result = MatchResult {
                    entity_id: scored.candidate.id.clone(),
                    similarity_score: percent_score(scored.similarity),
                    compatibility_score: scored.compatibility,
                    diversity_score: factor,
                    final_score,
                    reasons: artist_reasons(personality, &scored, final_score),
                };
                (scored.index, result)
            })
            .collect();
        ranked.sort_by(|(ia, a), (ib, b)| {
            b.final_score.total_cmp(&a.final_score).then(ia.cmp(ib))
        });

        debug!(
            personality = %personality,
            candidates = candidates.len(),
            returned = ranked.len(),
            diversity = options.diversity_boost,
            "artist matches scored"
        );
        Ok(ranked.into_iter().map(|(_, result)| result).collect())
    }

    /// Rank artworks by similarity, annotating style variety.
    pub fn find_best_artwork_matches(
        &self,
        user_vector: &[f32],
        candidates: &[ArtworkCandidate],
        limit: usize,
        strategy: SearchStrategy,
    ) -> Result<ArtworkMatches> {
        let report = self
            .search
            .find_best_matches(user_vector, candidates, limit, strategy)?;

        let mut seen_styles: Vec<&str> = Vec::new();
        let matches = report
            .matches
            .iter()
            .map(|scored| {
                let candidate = &candidates[scored.index];
                let style = candidate
                    .style
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty());
                let start = seen_styles.len().saturating_sub(DIVERSITY_WINDOW);
                let repeats = style.map_or(0, |style| {
                    seen_styles[start..]
                        .iter()
                        .filter(|seen| seen.eq_ignore_ascii_case(style))
                        .count()
                });
                let diversity = (0..repeats)
                    .fold(1.0, |factor, _| factor * SAME_STYLE_PENALTY)
                    .max(DIVERSITY_FLOOR);

                let mut reasons = Vec::new();
                if let Some(band) = score_band(scored.score) {
                    reasons.push(band.to_string());
                }
                if let Some(style) = style {
                    if seen_styles.iter().any(|seen| seen.eq_ignore_ascii_case(style)) {
                        reasons.push(format!("More {style} in your picks"));
                    } else {
                        reasons.push(format!("Adds {style} to your picks"));
                    }
                    seen_styles.push(style);
                }

                MatchResult {
                    entity_id: candidate.id.clone(),
                    similarity_score: percent_score(scored.score),
                    compatibility_score: 0.0,
                    diversity_score: diversity,
                    final_score: scored.score,
                    reasons,
                }
            })
            .collect();

        Ok(ArtworkMatches {
            matches,
            strategy_used: report.strategy_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use apt_embeddings::normalize::normalized;
    use assert_matches::assert_matches;

    fn t(code: &str) -> PersonalityType {
        PersonalityType::parse(code).unwrap()
    }

    fn artist(id: &str, vector: Vec<f32>, code: Option<&str>, style: Option<&str>) -> ArtistCandidate {
        ArtistCandidate {
            id: id.to_string(),
            vector,
            personality_type: code.map(str::to_string),
            style: style.map(str::to_string),
        }
    }

    fn artwork(id: &str, vector: Vec<f32>, style: Option<&str>) -> ArtworkCandidate {
        ArtworkCandidate {
            id: id.to_string(),
            vector,
            style: style.map(str::to_string),
        }
    }

    fn options(diversity_boost: bool) -> MatchOptions {
        MatchOptions {
            diversity_boost,
            ..MatchOptions::default()
        }
    }

    #[test]
    fn base_score_blends_similarity_and_compatibility() {
        let user = vec![1.0, 0.0];
        let candidates = vec![artist("a", vec![1.0, 0.0], Some("LAEF"), None)];
        let results = MatchingScorer::default()
            .find_best_artist_matches(&user, t("LAEF"), &candidates, &options(false))
            .unwrap();
        let r = &results[0];
        assert_eq!(r.similarity_score, 100);
        assert!((r.compatibility_score - 0.9).abs() < 1e-6);
        assert!((r.final_score - (0.7 + 0.27)).abs() < 1e-5);
        assert_eq!(r.diversity_score, 1.0);
        assert_eq!(r.reasons[0], "Excellent match for your taste");
        assert!(r.reasons.contains(&"Same personality type".to_string()));
        assert_eq!(
            r.reasons.iter().filter(|s| s.starts_with("Shares your")).count(),
            4
        );
    }

    #[test]
    fn diversity_penalizes_repeated_style() {
        let user = vec![1.0, 0.0];
        let v = vec![1.0, 0.0];
        let candidates = vec![
            artist("first", v.clone(), Some("LAEF"), Some("Impressionism")),
            artist("second", v.clone(), Some("LAEF"), Some("impressionism")),
            artist("third", normalized(&[0.9, 0.1]), Some("SRMC"), Some("Cubism")),
        ];
        let scorer = MatchingScorer::default();
        let plain = scorer
            .find_best_artist_matches(&user, t("LAEF"), &candidates, &options(false))
            .unwrap();
        let diverse = scorer
            .find_best_artist_matches(&user, t("LAEF"), &candidates, &options(true))
            .unwrap();

        let second = |results: &[MatchResult]| {
            results.iter().find(|r| r.entity_id == "second").cloned().unwrap()
        };
        assert!(second(&diverse).final_score < second(&plain).final_score);
        assert!((second(&diverse).diversity_score - 0.85 * 0.9).abs() < 1e-6);
        assert_eq!(diverse[0].entity_id, "first");
    }

    #[test]
    fn diversity_factor_is_floored() {
        let user = vec![1.0, 0.0];
        let candidates: Vec<ArtistCandidate> = (0..8)
            .map(|i| artist(&format!("a{i}"), vec![1.0, 0.0], Some("LAEF"), Some("Baroque")))
            .collect();
        let results = MatchingScorer::default()
            .find_best_artist_matches(&user, t("LAEF"), &candidates, &options(true))
            .unwrap();
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.diversity_score >= 0.5));
        assert!(results.iter().any(|r| (r.diversity_score - 0.5).abs() < 1e-6));
    }

    #[test]
    fn ties_keep_input_order_and_limit_applies() {
        let user = vec![1.0, 0.0];
        let candidates: Vec<ArtistCandidate> = (0..5)
            .map(|i| artist(&format!("a{i}"), vec![1.0, 0.0], None, None))
            .collect();
        let results = MatchingScorer::default()
            .find_best_artist_matches(
                &user,
                t("LAEF"),
                &candidates,
                &MatchOptions {
                    limit: 3,
                    ..options(true)
                },
            )
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["a0", "a1", "a2"]);
        assert!((results[0].compatibility_score - 0.5).abs() < 1e-6);
    }

    /// Rescans the whole pool on every pick.
    fn select_exhaustive<'a>(mut pool: Vec<Scored<'a>>, limit: usize) -> Vec<(usize, f32)> {
        let mut selected: Vec<(Scored<'a>, f32)> = Vec::new();
        while selected.len() < limit && !pool.is_empty() {
            let (position, factor) = pool
                .iter()
                .enumerate()
                .map(|(position, s)| (position, diversity_factor(s.candidate, &selected)))
                .max_by(|(pa, fa), (pb, fb)| {
                    (pool[*pa].base * fa)
                        .total_cmp(&(pool[*pb].base * fb))
                        .then(pb.cmp(pa))
                })
                .unwrap();
            selected.push((pool.remove(position), factor));
        }
        selected.into_iter().map(|(s, f)| (s.index, f)).collect()
    }

    fn labelled_pool(seed: u64, size: usize) -> Vec<ArtistCandidate> {
        use rand::{Rng, SeedableRng, rngs::StdRng};
        const STYLES: [&str; 4] = ["Baroque", "Cubism", "Ukiyo-e", "Fauvism"];
        const CODES: [&str; 3] = ["LAEF", "SRMC", "LRMF"];
        let mut rng = StdRng::seed_from_u64(seed);
        (0..size)
            .map(|i| {
                let style = STYLES[rng.random_range(0..STYLES.len())];
                let code = CODES[rng.random_range(0..CODES.len())];
                artist(&format!("a{i}"), vec![1.0, 0.0], Some(code), Some(style))
            })
            .collect()
    }

    fn sorted_pool<'a>(candidates: &'a [ArtistCandidate], bases: &[f32]) -> Vec<Scored<'a>> {
        let mut pool: Vec<Scored<'a>> = candidates
            .iter()
            .zip(bases)
            .enumerate()
            .map(|(index, (candidate, &base))| Scored {
                index,
                candidate,
                similarity: 0.0,
                compatibility: 0.0,
                base,
            })
            .collect();
        pool.sort_by(|a, b| b.base.total_cmp(&a.base).then(a.index.cmp(&b.index)));
        pool
    }

    #[test]
    fn pruned_selection_matches_full_rescan_on_large_pool() {
        use rand::{Rng, SeedableRng, rngs::StdRng};
        let candidates = labelled_pool(3, 600);
        let mut rng = StdRng::seed_from_u64(4);
        let bases: Vec<f32> = (0..candidates.len())
            .map(|_| rng.random_range(-0.5f32..1.0))
            .collect();

        let fast: Vec<(usize, f32)> = select_diverse(sorted_pool(&candidates, &bases), 600)
            .into_iter()
            .map(|(s, f)| (s.index, f))
            .collect();
        let slow = select_exhaustive(sorted_pool(&candidates, &bases), 600);
        assert_eq!(fast.len(), 600);
        assert_eq!(fast, slow);
    }

    #[test]
    fn full_limit_diverse_ranking_returns_every_artist() {
        let candidates = labelled_pool(9, 500);
        let results = MatchingScorer::default()
            .find_best_artist_matches(
                &[1.0, 0.0],
                t("LAEF"),
                &candidates,
                &MatchOptions {
                    limit: usize::MAX,
                    ..options(true)
                },
            )
            .unwrap();
        assert_eq!(results.len(), 500);
        assert!(
            results
                .windows(2)
                .all(|pair| pair[0].final_score >= pair[1].final_score)
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pruned_selection_matches_full_rescan(
                seed in any::<u64>(),
                bases in proptest::collection::vec(-1.0f32..1.0, 1..40),
                limit in 0usize..45,
            ) {
                let candidates = labelled_pool(seed, bases.len());
                let fast: Vec<(usize, f32)> = select_diverse(sorted_pool(&candidates, &bases), limit)
                    .into_iter()
                    .map(|(s, f)| (s.index, f))
                    .collect();
                let slow = select_exhaustive(sorted_pool(&candidates, &bases), limit);
                prop_assert_eq!(fast, slow);
            }
        }
    }

    #[test]
    fn synergy_reason() {
        let candidates = vec![artist("a", vec![0.0, 1.0], Some("SAEF"), None)];
        let results = MatchingScorer::default()
            .find_best_artist_matches(&[1.0, 0.0], t("LAEF"), &candidates, &options(false))
            .unwrap();
        assert_eq!(results[0].similarity_score, 0);
        assert!(results[0].reasons.iter().any(|r| r.starts_with("Complementary")));
        assert!(!results[0].reasons.iter().any(|r| r == "Same personality type"));
    }

    #[test]
    fn artist_dimension_mismatch_fails() {
        let candidates = vec![artist("a", vec![1.0], None, None)];
        assert_matches!(
            MatchingScorer::default().find_best_artist_matches(
                &[1.0, 0.0],
                t("LAEF"),
                &candidates,
                &options(true)
            ),
            Err(EngineError::DimensionMismatch { .. })
        );
    }

    #[test]
    fn artworks_rank_by_similarity_with_style_notes() {
        let user = vec![1.0, 0.0];
        let candidates = vec![
            artwork("far", vec![0.0, 1.0], Some("Cubism")),
            artwork("near", vec![1.0, 0.0], Some("Baroque")),
            artwork("close", normalized(&[1.0, 0.2]), Some("baroque")),
        ];
        let out = MatchingScorer::default()
            .find_best_artwork_matches(&user, &candidates, 3, SearchStrategy::Exact)
            .unwrap();
        assert_eq!(out.strategy_used, SearchStrategy::Exact);
        let ids: Vec<&str> = out.matches.iter().map(|m| m.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "close", "far"]);
        assert!(out.matches[0].reasons.contains(&"Adds Baroque to your picks".to_string()));
        assert!(out.matches[1].reasons.contains(&"More baroque in your picks".to_string()));
        assert!((out.matches[1].diversity_score - 0.85).abs() < 1e-6);
        assert_eq!(out.matches[2].similarity_score, 0);
    }

    #[test]
    fn options_follow_settings() {
        let settings = MatchingSettings {
            limit: 3,
            diversity_boost: false,
            ..MatchingSettings::default()
        };
        let options = MatchOptions::from(&settings);
        assert_eq!(options.limit, 3);
        assert!(!options.diversity_boost);
        let json = serde_json::to_value(&options).unwrap();
        assert!(json.get("personalityWeight").is_some());
    }
}
