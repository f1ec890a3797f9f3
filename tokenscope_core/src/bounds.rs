//! Bounds computation and render-volume normalization.
//!
//! Raw embedding magnitudes vary wildly between model layers, so projected
//! points are recentered on the bounding-box midpoint and uniformly scaled
//! until the largest axis span exactly fills the configured target size.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Guard against a zero divisor when every point coincides.
pub const MIN_RANGE_EPSILON: f64 = 1e-9;

/// Axis-aligned bounding box over one projected point set.
///
/// Computed once per animation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl Bounds {
    /// Computes the bounds of a point set, or `None` for an empty set.
    pub fn of_points(points: &[Vector3<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some(Self { min, max })
    }

    /// Center of the box; normalization translates every point by its
    /// negation.
    pub fn midpoint(&self) -> Vector3<f64> {
        (self.min + self.max) * 0.5
    }

    /// Per-axis extent, with degenerate axes (max == min) mapped to 1.0 so
    /// a flat or single-point cloud still normalizes instead of dividing by
    /// zero.
    pub fn guarded_ranges(&self) -> Vector3<f64> {
        let raw = self.max - self.min;
        Vector3::new(
            if raw.x > 0.0 { raw.x } else { 1.0 },
            if raw.y > 0.0 { raw.y } else { 1.0 },
            if raw.z > 0.0 { raw.z } else { 1.0 },
        )
    }
}

/// Rescales and recenters a point set to fill a `target_size` render volume.
///
/// Every point is translated by the negative bounds midpoint, then scaled by
/// `target_size / max(range_x, range_y, range_z, ε)`. The scale is uniform,
/// so relative spread between axes is preserved and the largest axis span
/// maps exactly to `target_size`.
pub fn normalize_points(points: &[Vector3<f64>], target_size: f64) -> Vec<Vector3<f64>> {
    let Some(bounds) = Bounds::of_points(points) else {
        return Vec::new();
    };
    let midpoint = bounds.midpoint();
    let ranges = bounds.guarded_ranges();
    let largest = ranges.x.max(ranges.y).max(ranges.z).max(MIN_RANGE_EPSILON);
    let scale = target_size / largest;
    points.iter().map(|p| (p - midpoint) * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_of_points() {
        let points = vec![
            Vector3::new(-1.0, 5.0, 0.0),
            Vector3::new(3.0, -2.0, 7.0),
            Vector3::new(0.0, 0.0, -4.0),
        ];
        let b = Bounds::of_points(&points).unwrap();
        assert_eq!(b.min, Vector3::new(-1.0, -2.0, -4.0));
        assert_eq!(b.max, Vector3::new(3.0, 5.0, 7.0));
        assert_eq!(b.midpoint(), Vector3::new(1.0, 1.5, 1.5));
    }

    #[test]
    fn test_bounds_empty() {
        assert!(Bounds::of_points(&[]).is_none());
        assert!(normalize_points(&[], 10.0).is_empty());
    }

    #[test]
    fn test_normalized_box_centered_and_sized() {
        let points = vec![
            Vector3::new(100.0, 2000.0, -50.0),
            Vector3::new(300.0, 2400.0, -10.0),
            Vector3::new(180.0, 2100.0, -30.0),
        ];
        let target = 10.0;
        let normalized = normalize_points(&points, target);
        let b = Bounds::of_points(&normalized).unwrap();

        // Centered at the origin within floating-point tolerance
        let mid = b.midpoint();
        assert_relative_eq!(mid.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(mid.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(mid.z, 0.0, epsilon = 1e-9);

        // Largest axis span equals the target size
        let spans = b.max - b.min;
        let largest = spans.x.max(spans.y).max(spans.z);
        assert_relative_eq!(largest, target, epsilon = 1e-9);
    }

    #[test]
    fn test_normalization_uniform_scale() {
        let points = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 2.0, 1.0)];
        let normalized = normalize_points(&points, 8.0);
        // Largest range is x (4.0), so scale is 2.0; y and z keep proportion.
        let spans = Bounds::of_points(&normalized).unwrap().max
            - Bounds::of_points(&normalized).unwrap().min;
        assert_relative_eq!(spans.x, 8.0);
        assert_relative_eq!(spans.y, 4.0);
        assert_relative_eq!(spans.z, 2.0);
    }

    #[test]
    fn test_degenerate_cloud_guarded() {
        // All points identical: ranges guard to 1.0, no division by zero.
        let points = vec![Vector3::new(3.0, 3.0, 3.0); 4];
        let normalized = normalize_points(&points, 10.0);
        assert_eq!(normalized.len(), 4);
        for p in &normalized {
            assert!(p.x.is_finite());
            assert_relative_eq!(p.x, 0.0);
            assert_relative_eq!(p.y, 0.0);
            assert_relative_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_single_degenerate_axis() {
        // Flat in z: z range guards to 1.0 but x still dominates the scale.
        let points = vec![
            Vector3::new(0.0, 1.0, 5.0),
            Vector3::new(10.0, 3.0, 5.0),
        ];
        let normalized = normalize_points(&points, 5.0);
        let b = Bounds::of_points(&normalized).unwrap();
        let spans = b.max - b.min;
        assert_relative_eq!(spans.x, 5.0);
        assert_relative_eq!(spans.z, 0.0);
    }
}
