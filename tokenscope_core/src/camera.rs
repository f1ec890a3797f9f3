//! Camera rotation controller - eased oscillation after the reveal
//! threshold.
//!
//! Observes the reveal fraction read-only. Once the fraction crosses the
//! configured threshold the controller latches active for the rest of the
//! run; only a full run reset returns it to the static state.

use crate::sequencer::RevealState;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;
use std::time::Duration;
use tracing::debug;

/// Rotation activation and motion constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Reveal fraction at which rotation begins
    pub threshold_fraction: f64,
    /// Oscillation angular frequency in rad/s
    pub angular_frequency: f64,
    /// Peak rotation angle in radians
    pub max_angle: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            threshold_fraction: 0.75,
            angular_frequency: 1.2,
            max_angle: FRAC_PI_4, // 45°
        }
    }
}

/// Smoothly oscillating whole-scene rotation.
pub struct RotationController {
    config: CameraConfig,
    /// Instant the threshold was crossed; also the elapsed-time origin
    activated_at: Option<Duration>,
}

impl RotationController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            activated_at: None,
        }
    }

    /// Latches rotation on the first observation at or past the threshold.
    ///
    /// Activation is monotonic within a run; later observations cannot move
    /// the origin or deactivate it. An empty run never activates (there is
    /// no cloud to rotate).
    pub fn observe(&mut self, state: &RevealState, now: Duration) {
        if self.activated_at.is_some() {
            return;
        }
        if state.total_steps > 0 && state.fraction() >= self.config.threshold_fraction {
            self.activated_at = Some(now);
            debug!(at = ?now, "rotation activated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.activated_at.is_some()
    }

    /// Instant the controller activated, if it has.
    pub fn activated_at(&self) -> Option<Duration> {
        self.activated_at
    }

    /// Scene rotation angle at `now`, in radians.
    ///
    /// `(1 − cos(elapsed·ω)) / 2 · max_angle`: starts at zero displacement,
    /// eases in, and oscillates bounded by `max_angle`. Inactive → 0.
    pub fn angle(&self, now: Duration) -> f64 {
        let Some(origin) = self.activated_at else {
            return 0.0;
        };
        let elapsed = now.saturating_sub(origin).as_secs_f64();
        (1.0 - (elapsed * self.config.angular_frequency).cos()) / 2.0 * self.config.max_angle
    }

    /// Clears activation and the elapsed-time origin for a fresh run.
    pub fn reset(&mut self) {
        self.activated_at = None;
    }
}
