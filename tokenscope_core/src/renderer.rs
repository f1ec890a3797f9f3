//! Scene assembly - one persistent primitive per revealed token.
//!
//! For every index below the sequencer's `current_step` the assembler emits
//! a point at the token's normalized position, its label, and (from the
//! second index on) a directed arrow from the previous point. Appearance is
//! a delayed tween anchored to the instant the index was revealed, so a
//! frame rendered at any clock value is reproducible. Building a scene
//! never mutates reveal state.

use crate::sequencer::{Phase, RevealState};
use crate::tween::{Easing, Tween};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Fixed cyclic palette (RGBA). A token's color is `PALETTE[i % len]`,
/// stable across rebuilds so each token keeps its visual identity.
pub const PALETTE: [[u8; 4]; 8] = [
    [0, 212, 255, 255],   // Cyan
    [255, 200, 0, 255],   // Yellow
    [255, 100, 100, 255], // Red-ish
    [50, 255, 100, 255],  // Green
    [255, 0, 255, 255],   // Magenta
    [100, 150, 255, 255], // Blue
    [255, 165, 0, 255],   // Orange
    [0, 255, 200, 255],   // Teal
];

/// Deterministic palette lookup for a token index.
pub fn palette_color(index: usize) -> [u8; 4] {
    PALETTE[index % PALETTE.len()]
}

/// Render-volume and appearance-timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Edge length of the render volume the normalized cloud fills
    pub target_size: f64,
    /// Appearance tween duration for a newly revealed point
    pub point_duration: Duration,
    /// Draw tween duration for a newly revealed arrow
    pub arrow_duration: Duration,
    pub easing: Easing,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_size: 10.0,
            point_duration: Duration::from_millis(300),
            arrow_duration: Duration::from_millis(450),
            easing: Easing::EaseOutCubic,
        }
    }
}

/// A revealed token's point and label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointMark {
    pub index: usize,
    pub position: Vector3<f64>,
    pub label: String,
    pub color: [u8; 4],
    /// Appearance progress in [0, 1]
    pub appear: f64,
}

/// A directed segment between two consecutive revealed tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrowMark {
    pub from_index: usize,
    pub to_index: usize,
    pub origin: Vector3<f64>,
    pub vector: Vector3<f64>,
    pub color: [u8; 4],
    /// Drawn fraction of the segment in [0, 1]
    pub draw: f64,
}

/// What the host should draw for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SceneContent {
    /// Explicit placeholder; never render a blank, ambiguous scene
    NoData,
    Cloud {
        points: Vec<PointMark>,
        arrows: Vec<ArrowMark>,
    },
}

/// A renderable frame handed upward to the host UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub run_id: Uuid,
    pub phase: Phase,
    pub content: SceneContent,
}

impl Scene {
    pub fn no_data(run_id: Uuid, phase: Phase) -> Self {
        Self {
            run_id,
            phase,
            content: SceneContent::NoData,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.content, SceneContent::NoData)
    }
}

/// Builds scenes from reveal state and remembers when each index appeared.
pub struct SceneAssembler {
    config: RenderConfig,
    /// First instant each index was observed revealed; tween anchors
    revealed_at: Vec<Option<Duration>>,
}

impl SceneAssembler {
    pub fn new(config: RenderConfig, total_steps: usize) -> Self {
        Self {
            config,
            revealed_at: vec![None; total_steps],
        }
    }

    /// Records reveal instants for indices that became visible by `now`.
    ///
    /// Reads the state, never writes it. Instants are write-once so calling
    /// this repeatedly (every frame) cannot restart a tween.
    pub fn observe(&mut self, state: &RevealState, now: Duration) {
        let revealed = state.current_step.min(self.revealed_at.len());
        for slot in &mut self.revealed_at[..revealed] {
            if slot.is_none() {
                *slot = Some(now);
            }
        }
    }

    /// Assembles the frame for `now`.
    ///
    /// Indices at or past `current_step` produce nothing. A missing label
    /// (token list shorter than the point set) degrades to an empty string
    /// instead of failing the frame.
    pub fn assemble(
        &self,
        run_id: Uuid,
        state: &RevealState,
        points: &[Vector3<f64>],
        tokens: &[String],
        now: Duration,
    ) -> Scene {
        if points.is_empty() {
            return Scene::no_data(run_id, state.phase);
        }
        let revealed = state.current_step.min(points.len());
        let mut point_marks = Vec::with_capacity(revealed);
        let mut arrow_marks = Vec::with_capacity(revealed.saturating_sub(1));
        for i in 0..revealed {
            let start = self.revealed_at.get(i).copied().flatten().unwrap_or(now);
            let appear = Tween::new(start, self.config.point_duration, self.config.easing)
                .progress(now);
            point_marks.push(PointMark {
                index: i,
                position: points[i],
                label: tokens.get(i).cloned().unwrap_or_default(),
                color: palette_color(i),
                appear,
            });
            if i > 0 {
                let draw = Tween::new(start, self.config.arrow_duration, self.config.easing)
                    .progress(now);
                arrow_marks.push(ArrowMark {
                    from_index: i - 1,
                    to_index: i,
                    origin: points[i - 1],
                    vector: points[i] - points[i - 1],
                    color: palette_color(i),
                    draw,
                });
            }
        }
        Scene {
            run_id,
            phase: state.phase,
            content: SceneContent::Cloud {
                points: point_marks,
                arrows: arrow_marks,
            },
        }
    }
}
