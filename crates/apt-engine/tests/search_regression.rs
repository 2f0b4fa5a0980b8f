//! Exact and approximate search against brute force.

use apt_embeddings::normalize::{cosine_similarity, normalized};
use apt_engine::{SearchStrategy, SimilarityEngine};
use apt_settings::SearchSettings;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIMS: usize = 64;
const POOL: usize = 5000;
const K: usize = 10;

fn random_units(rng: &mut StdRng, count: usize) -> Vec<Vec<f32>> {
    (0..count)
        .map(|_| {
            let v: Vec<f32> = (0..DIMS).map(|_| rng.random_range(-1.0f32..1.0)).collect();
            normalized(&v)
        })
        .collect()
}

fn brute_force(query: &[f32], pool: &[Vec<f32>], k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = pool
        .iter()
        .enumerate()
        .map(|(i, v)| (i, cosine_similarity(query, v)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().take(k).map(|(i, _)| i).collect()
}

#[test]
fn exact_search_equals_brute_force() {
    let mut rng = StdRng::seed_from_u64(17);
    let pool = random_units(&mut rng, POOL);
    let engine = SimilarityEngine::default();
    for query in random_units(&mut rng, 20) {
        let report = engine
            .find_best_matches(&query, &pool, K, SearchStrategy::Exact)
            .unwrap();
        let got: Vec<usize> = report.matches.iter().map(|m| m.index).collect();
        assert_eq!(got, brute_force(&query, &pool, K));
    }
}

#[test]
fn approximate_search_recall() {
    let mut rng = StdRng::seed_from_u64(42);
    let pool = random_units(&mut rng, POOL);
    let queries = random_units(&mut rng, 50);
    let engine = SimilarityEngine::new(SearchSettings::default());

    let mut overlap = 0usize;
    for query in &queries {
        let report = engine
            .find_best_matches(query, &pool, K, SearchStrategy::Approximate)
            .unwrap();
        assert_eq!(report.matches.len(), K);
        if report.strategy_used == SearchStrategy::Approximate {
            assert!(report.candidates_scored < POOL);
        }
        let truth = brute_force(query, &pool, K);
        overlap += report
            .matches
            .iter()
            .filter(|m| truth.contains(&m.index))
            .count();
    }
    let average = overlap as f64 / queries.len() as f64;
    assert!(average >= 7.0, "average overlap {average}");
}

#[test]
fn unbounded_k_ranks_entire_pool() {
    let mut rng = StdRng::seed_from_u64(8);
    let pool = random_units(&mut rng, POOL);
    let query = random_units(&mut rng, 1).remove(0);
    let engine = SimilarityEngine::default();
    for strategy in [SearchStrategy::Exact, SearchStrategy::Approximate] {
        let report = engine
            .find_best_matches(&query, &pool, usize::MAX, strategy)
            .unwrap();
        assert_eq!(report.strategy_used, SearchStrategy::Exact);
        let got: Vec<usize> = report.matches.iter().map(|m| m.index).collect();
        assert_eq!(got, brute_force(&query, &pool, POOL));
    }
}
