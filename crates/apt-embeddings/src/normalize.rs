//! Vector normalization and similarity functions.
//!
//! These functions do not check lengths; zipped operations stop at the
//! shorter slice. Callers that need a hard dimension check (the matching
//! engine) validate before calling.

/// Compute the L2 (Euclidean) norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// L2-normalize a vector in-place. Zero vectors remain zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 && norm.is_finite() {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Return an L2-normalized copy.
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    l2_normalize(&mut out);
    out
}

/// Dot product.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Matryoshka truncation: slice to `target_dims`, then L2 re-normalize.
///
/// If `target_dims >= v.len()`, returns a re-normalized copy of the full vector.
pub fn matryoshka_truncate(v: &[f32], target_dims: usize) -> Vec<f32> {
    let end = target_dims.min(v.len());
    normalized(&v[..end])
}

/// Cosine similarity: dot product divided by the product of the norms.
///
/// Exactly `0.0` when either vector has zero magnitude or a non-finite
/// component. Sums run in `f64` so magnitudes near the `f32` limits
/// neither overflow nor underflow. The result is clamped to `[-1, 1]` to
/// absorb rounding.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut ab, mut aa, mut bb) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        ab += x * y;
        aa += x * x;
        bb += y * y;
    }
    // Unmatched tail components still count toward the norms.
    for &x in a.iter().skip(b.len()) {
        aa += f64::from(x) * f64::from(x);
    }
    for &y in b.iter().skip(a.len()) {
        bb += f64::from(y) * f64::from(y);
    }

    let denominator = aa.sqrt() * bb.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let cosine = ab / denominator;
    if cosine.is_finite() {
        cosine.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

/// Whether every component is finite.
pub fn is_finite(v: &[f32]) -> bool {
    v.iter().all(|x| x.is_finite())
}
