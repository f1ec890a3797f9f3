//! Animation run lifecycle and the engine facade.
//!
//! Exactly one [`AnimationRun`] is active at a time. Submitting new input
//! bumps the engine's generation and cancels every pending timer of the
//! previous run *before* any new state is touched, so a stale callback can
//! never mutate a newer run's `RevealState`.

use crate::bounds::normalize_points;
use crate::camera::{CameraConfig, RotationController};
use crate::projection::project_batch;
use crate::renderer::{RenderConfig, Scene, SceneAssembler};
use crate::sanitize::{sanitize_batch, sanitize_points};
use crate::scheduler::TimerQueue;
use crate::sequencer::{Phase, RevealSequencer, RevealState, SequencerConfig, SequencerEvent};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// All engine tuning in one place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub sequencer: SequencerConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
}

/// Geometry supplied with one input, before sanitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputGeometry {
    /// Full-dimension hidden-state vectors, one per token
    Embeddings(Vec<Vec<f64>>),
    /// Precomputed 3D coordinates, one per token
    Points(Vec<Vec<f64>>),
    /// Upstream had nothing; render the placeholder
    Missing,
}

/// One sentence's worth of animation input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationInput {
    pub sentence: String,
    pub tokens: Vec<String>,
    pub geometry: InputGeometry,
}

impl AnimationInput {
    pub fn new(
        sentence: impl Into<String>,
        tokens: Vec<String>,
        geometry: InputGeometry,
    ) -> Self {
        Self {
            sentence: sentence.into(),
            tokens,
            geometry,
        }
    }

    /// Input with no geometry at all; the scene stays on its placeholder.
    pub fn no_data(sentence: impl Into<String>) -> Self {
        Self::new(sentence, Vec::new(), InputGeometry::Missing)
    }
}

/// The full lifecycle bound to one input.
struct AnimationRun {
    id: Uuid,
    generation: u64,
    tokens: Vec<String>,
    points: Vec<Vector3<f64>>,
    sequencer: RevealSequencer,
    assembler: SceneAssembler,
    camera: RotationController,
}

/// Facade owning the single active run and the shared timer queue.
pub struct AnimationEngine {
    config: EngineConfig,
    queue: TimerQueue<SequencerEvent>,
    run: Option<AnimationRun>,
    generation: u64,
}

impl AnimationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            queue: TimerQueue::new(),
            run: None,
            generation: 0,
        }
    }

    /// Binds new input, superseding any active run.
    ///
    /// Order matters: the previous generation's timers are cancelled first,
    /// then the fresh run is built and started. Returns the new run's id.
    pub fn submit(&mut self, input: AnimationInput, now: Duration) -> Uuid {
        if let Some(prev) = self.run.take() {
            let cancelled = self.queue.cancel_generation(prev.generation);
            debug!(run = %prev.id, cancelled, "superseding active run");
        }
        self.generation += 1;
        let generation = self.generation;

        let points = Self::build_points(&input.geometry, self.config.render.target_size);
        // No geometry means no reveal: the sequencer sees zero steps and the
        // scene stays on its placeholder.
        let total_steps = if points.is_empty() {
            0
        } else {
            input.tokens.len()
        };

        let mut sequencer =
            RevealSequencer::new(self.config.sequencer.clone(), &input.sentence, total_steps);
        sequencer.start(generation, now, &mut self.queue);

        let run = AnimationRun {
            id: Uuid::new_v4(),
            generation,
            tokens: input.tokens,
            points,
            sequencer,
            assembler: SceneAssembler::new(self.config.render.clone(), total_steps),
            camera: RotationController::new(self.config.camera.clone()),
        };
        debug!(run = %run.id, tokens = total_steps, "animation run started");
        let id = run.id;
        self.run = Some(run);
        id
    }

    /// Tears down the active run and cancels its timers (host unmount).
    pub fn clear(&mut self) {
        if let Some(prev) = self.run.take() {
            let cancelled = self.queue.cancel_generation(prev.generation);
            debug!(run = %prev.id, cancelled, "run cleared");
        }
    }

    /// Sanitize → project → normalize, per the geometry variant.
    fn build_points(geometry: &InputGeometry, target_size: f64) -> Vec<Vector3<f64>> {
        match geometry {
            InputGeometry::Embeddings(raw) => {
                let dim = raw.first().map(Vec::len).unwrap_or(0);
                let clean = sanitize_batch(Some(raw.as_slice()), dim);
                let projected = project_batch(&clean);
                normalize_points(&projected, target_size)
            }
            InputGeometry::Points(raw) => {
                let points = sanitize_points(Some(raw.as_slice()));
                normalize_points(&points, target_size)
            }
            InputGeometry::Missing => Vec::new(),
        }
    }

    /// Fires every due timer and lets the run's observers catch up.
    ///
    /// Events are applied at their scheduled instants, so a clock that
    /// jumped far ahead replays the chain deterministically.
    pub fn tick(&mut self, now: Duration) {
        let Some(run) = self.run.as_mut() else {
            // No live run; anything still queued is stale by definition.
            let _ = self.queue.pop_due(now, self.generation);
            return;
        };
        loop {
            let due = self.queue.pop_due(now, run.generation);
            if due.is_empty() {
                break;
            }
            for (at, event) in due {
                run.sequencer
                    .handle(event, at, run.generation, &mut self.queue);
                run.assembler.observe(run.sequencer.state(), at);
                run.camera.observe(run.sequencer.state(), at);
            }
        }
    }

    /// Earliest pending deadline, for the driver loop.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    /// Pending timer count (diagnostics; a healthy run keeps this at 1).
    pub fn pending_timers(&self) -> usize {
        self.queue.pending()
    }

    /// Read-only reveal state of the active run.
    pub fn state(&self) -> Option<&RevealState> {
        self.run.as_ref().map(|r| r.sequencer.state())
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run.as_ref().map(|r| r.id)
    }

    /// Animation-complete signal for the host (gates auto-scroll etc.).
    pub fn is_complete(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|r| r.sequencer.state().is_complete())
    }

    /// Whole-scene rotation angle at `now`, in radians.
    pub fn rotation_angle(&self, now: Duration) -> f64 {
        self.run.as_ref().map_or(0.0, |r| r.camera.angle(now))
    }

    pub fn rotation_active(&self) -> bool {
        self.run.as_ref().is_some_and(|r| r.camera.is_active())
    }

    /// Renderable frame for `now`.
    pub fn scene(&self, now: Duration) -> Scene {
        match &self.run {
            Some(run) => run.assembler.assemble(
                run.id,
                run.sequencer.state(),
                &run.points,
                &run.tokens,
                now,
            ),
            None => Scene::no_data(Uuid::nil(), Phase::Idle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::SceneContent;

    fn one_hot_input(num_tokens: usize, dim: usize) -> AnimationInput {
        let tokens: Vec<String> = (0..num_tokens).map(|i| format!(" tok{}", i)).collect();
        let vectors: Vec<Vec<f64>> = (0..num_tokens)
            .map(|_| {
                let mut v = vec![0.0; dim];
                v[0] = 1.0;
                v
            })
            .collect();
        AnimationInput::new("one hot test", tokens, InputGeometry::Embeddings(vectors))
    }

    /// Steps the engine deadline by deadline until its timers drain.
    fn drive_to_completion(engine: &mut AnimationEngine) {
        let mut guard = 0;
        while let Some(deadline) = engine.next_deadline() {
            guard += 1;
            assert!(guard < 100_000, "animation did not terminate");
            engine.tick(deadline);
        }
    }

    /// Steps until the predicate holds, returning the clock value reached.
    fn drive_until(
        engine: &mut AnimationEngine,
        mut pred: impl FnMut(&AnimationEngine) -> bool,
    ) -> Duration {
        let mut last = Duration::ZERO;
        let mut guard = 0;
        while !pred(engine) {
            guard += 1;
            assert!(guard < 100_000, "predicate never held");
            let deadline = engine.next_deadline().expect("timers drained early");
            engine.tick(deadline);
            last = deadline;
        }
        last
    }

    #[test]
    fn test_full_reveal_five_tokens() {
        let mut engine = AnimationEngine::new(EngineConfig::default());
        engine.submit(one_hot_input(5, 768), Duration::ZERO);
        drive_to_completion(&mut engine);

        let state = engine.state().expect("run is live");
        assert_eq!(state.current_step, 5);
        assert_eq!(state.total_steps, 5);
        assert!(engine.is_complete());

        let scene = engine.scene(Duration::from_secs(60));
        let SceneContent::Cloud { points, arrows } = scene.content else {
            panic!("expected a cloud");
        };
        assert_eq!(points.len(), 5);
        assert_eq!(arrows.len(), 4);
        for p in &points {
            assert!(p.position.x.is_finite());
            assert!(p.position.y.is_finite());
            assert!(p.position.z.is_finite());
            assert_eq!(p.appear, 1.0);
        }
    }

    #[test]
    fn test_empty_input_schedules_nothing() {
        let mut engine = AnimationEngine::new(EngineConfig::default());
        engine.submit(
            AnimationInput::new("", Vec::new(), InputGeometry::Embeddings(Vec::new())),
            Duration::ZERO,
        );

        assert_eq!(engine.next_deadline(), None);
        assert_eq!(engine.pending_timers(), 0);
        assert!(engine.is_complete());
        assert!(engine.scene(Duration::ZERO).is_no_data());
    }

    #[test]
    fn test_nan_is_sanitized_before_geometry() {
        let tokens = vec!["a".to_string(), "b".to_string()];
        let mut v0 = vec![1.0; 8];
        v0[3] = f64::NAN;
        let v1 = vec![2.0; 8];
        let mut engine = AnimationEngine::new(EngineConfig::default());
        engine.submit(
            AnimationInput::new("ab", tokens, InputGeometry::Embeddings(vec![v0, v1])),
            Duration::ZERO,
        );
        drive_to_completion(&mut engine);

        let scene = engine.scene(Duration::from_secs(60));
        let SceneContent::Cloud { points, arrows } = scene.content else {
            panic!("expected a cloud");
        };
        for p in &points {
            assert!(p.position.iter().all(|c| c.is_finite()));
        }
        for a in &arrows {
            assert!(a.vector.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_precomputed_points_fill_render_volume() {
        use crate::bounds::Bounds;

        let tokens: Vec<String> = (0..3).map(|i| format!("t{}", i)).collect();
        let raw = vec![
            vec![100.0, 0.0, 0.0],
            vec![900.0, 50.0, -20.0],
            vec![500.0, 25.0, -10.0],
        ];
        let mut engine = AnimationEngine::new(EngineConfig::default());
        engine.submit(
            AnimationInput::new("abc", tokens, InputGeometry::Points(raw)),
            Duration::ZERO,
        );
        drive_to_completion(&mut engine);

        let scene = engine.scene(Duration::from_secs(60));
        let SceneContent::Cloud { points, .. } = scene.content else {
            panic!("expected a cloud");
        };
        let positions: Vec<_> = points.iter().map(|p| p.position).collect();
        let b = Bounds::of_points(&positions).expect("non-empty");
        let spans = b.max - b.min;
        let largest = spans.x.max(spans.y).max(spans.z);
        assert!((largest - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_mid_run_reset_discards_previous_run() {
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let first_id = engine.submit(one_hot_input(6, 32), Duration::ZERO);
        let reset_at = drive_until(&mut engine, |e| {
            e.state().is_some_and(|s| s.current_step == 2)
        });

        // New input arrives mid-animation.
        let second_id = engine.submit(one_hot_input(4, 32), reset_at);
        assert_ne!(first_id, second_id);

        // State resets immediately and only the new run's timer is pending.
        let state = engine.state().expect("run is live");
        assert_eq!(state.current_step, 0);
        assert_eq!(state.total_steps, 4);
        assert_eq!(state.phase, Phase::Typing);
        assert_eq!(engine.pending_timers(), 1);

        drive_to_completion(&mut engine);
        let scene = engine.scene(reset_at + Duration::from_secs(60));
        assert_eq!(scene.run_id, second_id);
        let SceneContent::Cloud { points, .. } = scene.content else {
            panic!("expected a cloud");
        };
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn test_rotation_activates_exactly_once() {
        let mut engine = AnimationEngine::new(EngineConfig::default());
        engine.submit(one_hot_input(5, 16), Duration::ZERO);

        drive_until(&mut engine, |e| {
            e.state().is_some_and(|s| s.current_step == 3)
        });
        assert!(!engine.rotation_active(), "active before the threshold");

        drive_until(&mut engine, |e| {
            e.state().is_some_and(|s| s.current_step == 4)
        });
        assert!(engine.rotation_active(), "4/5 crosses the 0.75 threshold");
        assert_eq!(
            engine.state().map(|s| s.phase),
            Some(Phase::RotationActive)
        );

        drive_to_completion(&mut engine);
        assert!(engine.rotation_active(), "activation is monotonic");
    }

    #[test]
    fn test_clear_cancels_everything() {
        let mut engine = AnimationEngine::new(EngineConfig::default());
        engine.submit(one_hot_input(3, 16), Duration::ZERO);
        assert!(engine.pending_timers() > 0);

        engine.clear();
        assert_eq!(engine.pending_timers(), 0);
        assert_eq!(engine.run_id(), None);
        assert!(engine.scene(Duration::ZERO).is_no_data());
    }

    #[test]
    fn test_low_dimension_embeddings_degrade_to_placeholder() {
        let tokens = vec!["x".to_string(), "y".to_string()];
        let mut engine = AnimationEngine::new(EngineConfig::default());
        engine.submit(
            AnimationInput::new(
                "xy",
                tokens,
                InputGeometry::Embeddings(vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
            ),
            Duration::ZERO,
        );
        assert_eq!(engine.next_deadline(), None);
        assert!(engine.scene(Duration::ZERO).is_no_data());
    }
}
