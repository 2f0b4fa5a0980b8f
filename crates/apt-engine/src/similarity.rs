//! Similarity engine: cosine similarity and top-k search.
//!
//! The exact path splits candidates into fixed-size chunks, scores each
//! chunk on the rayon pool into a bounded min-heap, and merges the heaps.
//! Heap entries order by `(score, earlier index wins)`, so merging is
//! commutative and associative and the result does not depend on how
//! rayon schedules the chunks.
//!
//! The approximate path is opt-in via [`SearchStrategy::Approximate`] and
//! only taken for pools above the configured threshold. See [`crate::lsh`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use apt_embeddings::normalize::cosine_similarity;
use apt_settings::SearchSettings;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{Result, check_dimension};
use crate::lsh::SignHasher;

/// Cosine similarity in `[-1, 1]`.
///
/// Exactly `0.0` if either vector has zero magnitude; fails on a length
/// mismatch.
pub fn similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimension(a.len(), b.len())?;
    Ok(cosine_similarity(a, b))
}

/// Search path selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStrategy {
    /// Score every candidate.
    #[default]
    Exact,
    /// Prune with a sign hash first, when the pool is large enough.
    Approximate,
}

impl SearchStrategy {
    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Approximate => "approximate",
        }
    }
}

/// One scored candidate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMatch {
    /// Position in the candidate slice.
    pub index: usize,
    /// Cosine similarity to the query.
    pub score: f32,
}

impl Eq for ScoredMatch {}

impl Ord for ScoredMatch {
    /// Greater is better: higher score, then lower index.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for ScoredMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Search outcome, including the path actually taken.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    /// Best matches, descending by score, ties by candidate order.
    pub matches: Vec<ScoredMatch>,
    /// The path that produced `matches`.
    pub strategy_used: SearchStrategy,
    /// Candidates scored exactly.
    pub candidates_scored: usize,
}

/// Bounded min-heap keeping the `k` best entries seen.
struct TopK {
    k: usize,
    heap: BinaryHeap<Reverse<ScoredMatch>>,
}

impl TopK {
    /// `expected` bounds the up-front allocation; the heap grows past it
    /// on demand.
    fn new(k: usize, expected: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.min(expected)),
        }
    }

    fn push(&mut self, entry: ScoredMatch) {
        if self.heap.len() < self.k {
            self.heap.push(Reverse(entry));
        } else if let Some(&Reverse(worst)) = self.heap.peek() {
            if entry > worst {
                let _ = self.heap.pop();
                self.heap.push(Reverse(entry));
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for Reverse(entry) in other.heap {
            self.push(entry);
        }
        self
    }

    fn into_sorted(self) -> Vec<ScoredMatch> {
        let mut out: Vec<ScoredMatch> = self.heap.into_iter().map(|Reverse(e)| e).collect();
        out.sort_by(|a, b| b.cmp(a));
        out
    }
}

/// Exact top-k over `candidates`, optionally restricted to `subset`
/// (indices into `candidates`). Dimensions must already be validated.
fn exact_top_k<V>(
    query: &[f32],
    candidates: &[V],
    subset: Option<&[usize]>,
    k: usize,
    chunk_size: usize,
) -> Vec<ScoredMatch>
where
    V: AsRef<[f32]> + Sync,
{
    if k == 0 {
        return vec![];
    }
    let chunk_size = chunk_size.max(1);
    let score = |index: usize| ScoredMatch {
        index,
        score: cosine_similarity(query, candidates[index].as_ref()),
    };

    let merged = match subset {
        None => candidates
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let base = chunk_index * chunk_size;
                let mut top = TopK::new(k, chunk.len());
                for offset in 0..chunk.len() {
                    top.push(score(base + offset));
                }
                top
            })
            .reduce(|| TopK::new(k, 0), TopK::merge),
        Some(indices) => indices
            .par_chunks(chunk_size)
            .map(|chunk| {
                let mut top = TopK::new(k, chunk.len());
                for &index in chunk {
                    top.push(score(index));
                }
                top
            })
            .reduce(|| TopK::new(k, 0), TopK::merge),
    };
    merged.into_sorted()
}

/// Top-k similarity search over in-memory candidates.
#[derive(Clone, Debug, Default)]
pub struct SimilarityEngine {
    settings: SearchSettings,
}

impl SimilarityEngine {
    /// Create an engine with the given search settings.
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    /// Search settings in use.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Return the `min(k, candidates.len())` best candidates for `query`.
    ///
    /// Any candidate whose dimension differs from the query fails the
    /// whole search.
    pub fn find_best_matches<V>(
        &self,
        query: &[f32],
        candidates: &[V],
        k: usize,
        strategy: SearchStrategy,
    ) -> Result<SearchReport>
    where
        V: AsRef<[f32]> + Sync,
    {
        for candidate in candidates {
            check_dimension(query.len(), candidate.as_ref().len())?;
        }
        let k = k.min(candidates.len());

        let report = match strategy {
            SearchStrategy::Approximate if candidates.len() > self.settings.approximate_threshold => {
                self.approximate(query, candidates, k)
            }
            SearchStrategy::Approximate => {
                debug!(
                    pool = candidates.len(),
                    threshold = self.settings.approximate_threshold,
                    "pool below approximate threshold, using exact search"
                );
                self.exact(query, candidates, k)
            }
            SearchStrategy::Exact => self.exact(query, candidates, k),
        };

        metrics::counter!("similarity_searches_total", "strategy" => report.strategy_used.as_str())
            .increment(1);
        debug!(
            strategy = report.strategy_used.as_str(),
            pool = candidates.len(),
            scored = report.candidates_scored,
            returned = report.matches.len(),
            "similarity search complete"
        );
        Ok(report)
    }

    fn exact<V>(&self, query: &[f32], candidates: &[V], k: usize) -> SearchReport
    where
        V: AsRef<[f32]> + Sync,
    {
        SearchReport {
            matches: exact_top_k(query, candidates, None, k, self.settings.chunk_size),
            strategy_used: SearchStrategy::Exact,
            candidates_scored: candidates.len(),
        }
    }

    fn approximate<V>(&self, query: &[f32], candidates: &[V], k: usize) -> SearchReport
    where
        V: AsRef<[f32]> + Sync,
    {
        let hasher = SignHasher::new(query.len(), self.settings.lsh_bits);
        let survivors = hasher.surviving_candidates(query, candidates);
        if survivors.len() < k {
            warn!(
                survivors = survivors.len(),
                k, "too few hash survivors, falling back to exact search"
            );
            return self.exact(query, candidates, k);
        }
        SearchReport {
            matches: exact_top_k(query, candidates, Some(&survivors), k, self.settings.chunk_size),
            strategy_used: SearchStrategy::Approximate,
            candidates_scored: survivors.len(),
        }
    }
}
