//! The dimensionality reducer - mean-centering plus axis truncation.
//!
//! Each token's embedding is centered on the per-dimension mean of the
//! batch, then the first three dimensions become its projected point. This
//! is intentionally NOT a covariance eigen-decomposition: layout consumers
//! depend on the exact (weaker) semantic, and the goal is relative visual
//! spread, not statistically faithful variance explanation. Do not upgrade
//! it to a true PCA.

use nalgebra::Vector3;

/// Computes the per-dimension mean across a uniform batch.
///
/// Returns an empty vector for an empty batch.
pub fn dimension_means(batch: &[Vec<f64>]) -> Vec<f64> {
    let Some(first) = batch.first() else {
        return Vec::new();
    };
    let dim = first.len();
    let mut means = vec![0.0; dim];
    for vector in batch {
        for (m, v) in means.iter_mut().zip(vector.iter()) {
            *m += v;
        }
    }
    let count = batch.len() as f64;
    for m in &mut means {
        *m /= count;
    }
    means
}

/// Projects a sanitized batch down to 3D points.
///
/// Edge case: an empty batch, or one with fewer than 3 dimensions, yields an
/// empty point set. The caller treats that as "no data" and renders the
/// placeholder instead of failing.
pub fn project_batch(batch: &[Vec<f64>]) -> Vec<Vector3<f64>> {
    let Some(first) = batch.first() else {
        return Vec::new();
    };
    if first.len() < 3 {
        return Vec::new();
    }
    let means = dimension_means(batch);
    batch
        .iter()
        .map(|v| {
            Vector3::new(
                v[0] - means[0],
                v[1] - means[1],
                v[2] - means[2],
            )
        })
        .collect()
}
