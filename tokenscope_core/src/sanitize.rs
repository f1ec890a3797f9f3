//! Vector sanitation for upstream embedding payloads.
//!
//! Hidden-state matrices arrive from an external inference service and may
//! be ragged, truncated, or carry non-finite entries. Everything downstream
//! (projection, bounds) assumes fixed-length finite vectors, so all input
//! passes through here first. A single NaN reaching the bounding-box math
//! would poison every normalized coordinate of the run.

use nalgebra::Vector3;

/// Returns the value unchanged if finite, 0.0 otherwise.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Coerces a single raw vector to exactly `dim` finite entries.
///
/// Shorter input is zero-padded, longer input truncated, non-finite entries
/// replaced with 0.0.
pub fn sanitize_vector(raw: &[f64], dim: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(dim);
    for i in 0..dim {
        out.push(raw.get(i).copied().map_or(0.0, finite_or_zero));
    }
    out
}

/// Sanitizes a whole batch to uniform `dim`-length finite vectors.
///
/// Missing input yields an empty batch; this function never panics on any
/// shape the upstream service can produce.
pub fn sanitize_batch(raw: Option<&[Vec<f64>]>, dim: usize) -> Vec<Vec<f64>> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    if dim == 0 {
        return Vec::new();
    }
    raw.iter().map(|v| sanitize_vector(v, dim)).collect()
}

/// The length-3 call site: coerces precomputed 3D coordinates into finite
/// points.
pub fn sanitize_points(raw: Option<&[Vec<f64>]>) -> Vec<Vector3<f64>> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.iter()
        .map(|v| {
            let p = sanitize_vector(v, 3);
            Vector3::new(p[0], p[1], p[2])
        })
        .collect()
}
