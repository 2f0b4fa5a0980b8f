//! Prototype guardrail shared by the builder and the evolution engine.
//!
//! A user vector must keep cosine similarity of at least
//! [`MIN_PROTOTYPE_SIMILARITY`] to its type's prototype. Vectors that drift
//! below the bound are blended 80/20 toward the prototype and renormalized
//! until it holds again.

use apt_embeddings::normalize::{cosine_similarity, is_finite, l2_norm, l2_normalize};
use tracing::{debug, warn};

/// Lower bound on similarity between a user vector and its prototype.
pub const MIN_PROTOTYPE_SIMILARITY: f32 = 0.7;

/// Share of the drifted vector kept on each blend.
const BLEND_KEEP: f32 = 0.8;

/// Blends are geometric, so this is only reached from a near-antipodal start.
const MAX_BLENDS: usize = 64;

/// Return `vector` normalized, pulled back toward `prototype` if needed.
///
/// The returned vector is exactly the one whose similarity was checked.
/// Non-finite input or a blend that fails to converge yields the prototype
/// itself.
pub fn enforce(mut vector: Vec<f32>, prototype: &[f32], source: &'static str) -> Vec<f32> {
    if !is_finite(&vector) || !l2_norm(&vector).is_finite() {
        warn!(source, "non-finite user vector, resetting to prototype");
        metrics::counter!("guardrail_blends_total", "source" => source).increment(1);
        return prototype.to_vec();
    }
    l2_normalize(&mut vector);

    let mut blends = 0usize;
    loop {
        let similarity = cosine_similarity(&vector, prototype);
        if similarity >= MIN_PROTOTYPE_SIMILARITY {
            break;
        }
        if blends == MAX_BLENDS {
            warn!(source, blends, "guardrail blend did not converge, resetting to prototype");
            return prototype.to_vec();
        }
        for (x, p) in vector.iter_mut().zip(prototype) {
            *x = BLEND_KEEP * *x + (1.0 - BLEND_KEEP) * p;
        }
        l2_normalize(&mut vector);
        blends += 1;
    }

    if blends > 0 {
        metrics::counter!("guardrail_blends_total", "source" => source).increment(1);
        debug!(source, blends, "user vector blended toward prototype");
    }
    vector
}
