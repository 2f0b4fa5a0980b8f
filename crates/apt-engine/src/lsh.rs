//! Sign hashing for approximate search.
//!
//! Each bit is the sign of one sampled dimension, with samples evenly
//! spaced over the vector. Candidates whose hash differs from the query's
//! in more than [`MAX_HAMMING_DISTANCE`] bits are pruned before exact
//! scoring.

use rayon::prelude::*;

/// Largest Hamming distance that survives pruning.
pub const MAX_HAMMING_DISTANCE: u32 = 2;

/// B-bit sign hash over evenly spaced dimensions.
#[derive(Clone, Debug)]
pub struct SignHasher {
    sample_dims: Vec<usize>,
}

impl SignHasher {
    /// Sample `bits` dimensions out of `dimensions`.
    ///
    /// `bits` is clamped to `1..=min(64, dimensions)`.
    pub fn new(dimensions: usize, bits: usize) -> Self {
        let bits = bits.clamp(1, dimensions.clamp(1, 64));
        let sample_dims = (0..bits).map(|i| i * dimensions / bits).collect();
        Self { sample_dims }
    }

    /// Number of hash bits.
    pub fn bits(&self) -> usize {
        self.sample_dims.len()
    }

    /// Dimensions sampled, in bit order.
    pub fn sample_dims(&self) -> &[usize] {
        &self.sample_dims
    }

    /// Hash `vector`. Bit `i` is set when the sampled component is `>= 0`.
    pub fn hash(&self, vector: &[f32]) -> u64 {
        self.sample_dims
            .iter()
            .enumerate()
            .fold(0u64, |acc, (bit, &dim)| {
                if vector.get(dim).is_some_and(|x| *x >= 0.0) {
                    acc | (1 << bit)
                } else {
                    acc
                }
            })
    }

    /// Indices of candidates within [`MAX_HAMMING_DISTANCE`] of the query,
    /// in candidate order.
    pub fn surviving_candidates<V>(&self, query: &[f32], candidates: &[V]) -> Vec<usize>
    where
        V: AsRef<[f32]> + Sync,
    {
        let query_hash = self.hash(query);
        candidates
            .par_iter()
            .enumerate()
            .filter(|(_, c)| hamming(query_hash, self.hash(c.as_ref())) <= MAX_HAMMING_DISTANCE)
            .map(|(index, _)| index)
            .collect()
    }
}

fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}
