//! Deterministic time-parameterized interpolation.
//!
//! Appearance animation is a pure function of elapsed time: given a start
//! instant, a duration, and an easing curve, progress in [0, 1] is computed
//! from the clock alone, independent of frame rate. The same clock values
//! always reproduce the same frame.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Easing curves for appearance and arrow-draw animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    /// Constant velocity
    Linear,
    /// 3t² − 2t³, zero slope at both ends
    SmoothStep,
    /// 1 − (1 − t)³, fast start with a soft landing
    EaseOutCubic,
}

impl Easing {
    /// Maps linear progress `t ∈ [0, 1]` through the curve.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// A delayed tween: dormant before `start`, eased over `duration`, then
/// pinned at 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub start: Duration,
    pub duration: Duration,
    pub easing: Easing,
}

impl Tween {
    pub fn new(start: Duration, duration: Duration, easing: Easing) -> Self {
        Self {
            start,
            duration,
            easing,
        }
    }

    /// Progress in [0, 1] at `now`.
    ///
    /// Before `start` the tween has not begun (0.0). A zero-duration tween
    /// steps straight to 1.0 once started.
    pub fn progress(&self, now: Duration) -> f64 {
        if now < self.start {
            return 0.0;
        }
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = (now - self.start).as_secs_f64();
        let t = elapsed / self.duration.as_secs_f64();
        self.easing.apply(t)
    }

    /// True once the tween has reached its end state.
    pub fn is_finished(&self, now: Duration) -> bool {
        now >= self.start + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tween_dormant_before_start() {
        let tw = Tween::new(
            Duration::from_millis(100),
            Duration::from_millis(200),
            Easing::Linear,
        );
        assert_eq!(tw.progress(Duration::from_millis(0)), 0.0);
        assert_eq!(tw.progress(Duration::from_millis(99)), 0.0);
    }

    #[test]
    fn test_tween_linear_midpoint_and_clamp() {
        let tw = Tween::new(
            Duration::from_millis(100),
            Duration::from_millis(200),
            Easing::Linear,
        );
        assert_relative_eq!(tw.progress(Duration::from_millis(200)), 0.5);
        assert_relative_eq!(tw.progress(Duration::from_millis(300)), 1.0);
        assert_relative_eq!(tw.progress(Duration::from_secs(60)), 1.0);
        assert!(tw.is_finished(Duration::from_millis(300)));
    }

    #[test]
    fn test_zero_duration_steps() {
        let tw = Tween::new(Duration::from_millis(50), Duration::ZERO, Easing::SmoothStep);
        assert_eq!(tw.progress(Duration::from_millis(49)), 0.0);
        assert_eq!(tw.progress(Duration::from_millis(50)), 1.0);
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::SmoothStep, Easing::EaseOutCubic] {
            assert_relative_eq!(easing.apply(0.0), 0.0);
            assert_relative_eq!(easing.apply(1.0), 1.0);
            // Monotonic over a coarse sweep
            let mut prev = 0.0;
            for i in 0..=20 {
                let v = easing.apply(i as f64 / 20.0);
                assert!(v >= prev - 1e-12);
                prev = v;
            }
        }
    }

    #[test]
    fn test_smoothstep_shape() {
        assert_relative_eq!(Easing::SmoothStep.apply(0.5), 0.5);
        assert!(Easing::SmoothStep.apply(0.25) < 0.25);
        assert!(Easing::SmoothStep.apply(0.75) > 0.75);
    }
}
