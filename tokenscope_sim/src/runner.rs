//! Scenario runner - executes animation acceptance scenarios.

use crate::context::SimContext;
use crate::oracle::EmbeddingOracle;
use crate::scenarios::ScenarioId;

use nalgebra::Vector3;
use tokenscope_core::engine::{AnimationEngine, AnimationInput, EngineConfig, InputGeometry};
use tokenscope_core::renderer::SceneContent;
use tokenscope_core::sequencer::Phase;
use tokenscope_env::ScopeContext;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the scenario passed all assertions
    pub passed: bool,

    /// Total timer events fired
    pub total_events: u64,

    /// Final virtual time in seconds
    pub final_time_secs: f64,

    /// Final reveal step of the live run
    pub final_step: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during the run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Reveal steps observed
    pub reveal_steps: u64,

    /// Scenes assembled for assertions
    pub scenes_built: u64,

    /// Peak pending-timer count (healthy runs stay at 1)
    pub max_pending_timers: usize,

    /// Animation runs started
    pub runs_started: u64,
}

/// Accumulates assertion failures instead of panicking mid-scenario.
struct Checks {
    failures: Vec<String>,
}

impl Checks {
    fn new() -> Self {
        Self {
            failures: Vec::new(),
        }
    }

    fn expect(&mut self, condition: bool, message: impl Into<String>) {
        if !condition {
            self.failures.push(message.into());
        }
    }

    fn into_failure(self) -> Option<String> {
        if self.failures.is_empty() {
            None
        } else {
            Some(self.failures.join("; "))
        }
    }
}

/// Runs animation scenarios on a virtual clock.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Safety budget on fired timer events
    max_events: u64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_events: 100_000,
        }
    }

    /// Sets the timer-event budget.
    pub fn with_event_budget(mut self, max_events: u64) -> Self {
        self.max_events = max_events;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        if scenario.is_stress() {
            info!("stress scenario - pushing the timer queue");
        }

        match scenario {
            ScenarioId::FullReveal => self.run_full_reveal(),
            ScenarioId::EmptyInput => self.run_empty_input(),
            ScenarioId::NanVector => self.run_nan_vector(),
            ScenarioId::RotationThreshold => self.run_rotation_threshold(),
            ScenarioId::MidRunRestart => self.run_mid_run_restart(),
            ScenarioId::DegenerateCloud => self.run_degenerate_cloud(),
            ScenarioId::RestartStorm => self.run_restart_storm(),
            ScenarioId::LongHaul => self.run_long_haul(),
        }
    }

    /// Advances the virtual clock to the next deadline and fires it.
    ///
    /// Returns false when no deadline is pending.
    fn advance_once(
        ctx: &SimContext,
        engine: &mut AnimationEngine,
        metrics: &mut ScenarioMetrics,
    ) -> bool {
        let Some(deadline) = engine.next_deadline() else {
            return false;
        };
        let now = ctx.now();
        if deadline > now {
            ctx.advance_time(deadline - now);
        }
        engine.tick(ctx.now());
        metrics.max_pending_timers = metrics.max_pending_timers.max(engine.pending_timers());
        true
    }

    /// Drives until the predicate holds or the queue drains.
    ///
    /// Returns the number of events fired, tracking reveal steps as they
    /// pass.
    fn drive_until(
        &self,
        ctx: &SimContext,
        engine: &mut AnimationEngine,
        metrics: &mut ScenarioMetrics,
        checks: &mut Checks,
        mut stop: impl FnMut(&AnimationEngine) -> bool,
    ) -> u64 {
        let mut events = 0;
        let mut prev_step = engine.state().map(|s| s.current_step).unwrap_or(0);
        while !stop(engine) {
            if events >= self.max_events {
                checks.expect(false, format!("event budget {} exceeded", self.max_events));
                break;
            }
            if !Self::advance_once(ctx, engine, metrics) {
                break;
            }
            events += 1;
            let step = engine.state().map(|s| s.current_step).unwrap_or(0);
            if step > prev_step {
                metrics.reveal_steps += (step - prev_step) as u64;
                checks.expect(
                    step == prev_step + 1,
                    format!("reveal step jumped from {} to {}", prev_step, step),
                );
                prev_step = step;
            }
        }
        events
    }

    fn finish(
        &self,
        scenario: ScenarioId,
        ctx: &SimContext,
        engine: &AnimationEngine,
        total_events: u64,
        checks: Checks,
        metrics: ScenarioMetrics,
    ) -> ScenarioResult {
        let failure_reason = checks.into_failure();
        let passed = failure_reason.is_none();
        if passed {
            info!("✓ {} complete: {} events", scenario.name(), total_events);
        } else {
            warn!(
                "✗ {} failed: {}",
                scenario.name(),
                failure_reason.as_deref().unwrap_or("unknown")
            );
        }
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            total_events,
            final_time_secs: ctx.now().as_secs_f64(),
            final_step: engine.state().map(|s| s.current_step).unwrap_or(0),
            failure_reason,
            metrics,
        }
    }

    /// SIM-001: FullReveal - 5 one-hot 768-dim vectors, full staged reveal.
    ///
    /// **Assertion**: 5 point marks with stable distinct colors, 4 arrows,
    /// exactly 5 reveal ticks, completion.
    fn run_full_reveal(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let mut oracle = EmbeddingOracle::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut checks = Checks::new();

        let (sentence, tokens) = oracle.sentence(5);
        let batch = EmbeddingOracle::one_hot_batch(5, 768);
        engine.submit(
            AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
            ctx.now(),
        );
        metrics.runs_started = 1;

        let events = self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.is_complete() && e.next_deadline().is_none()
        });

        checks.expect(engine.is_complete(), "run did not complete");
        checks.expect(
            metrics.reveal_steps == 5,
            format!("expected 5 reveal steps, got {}", metrics.reveal_steps),
        );

        let scene = engine.scene(ctx.now());
        metrics.scenes_built += 1;
        match &scene.content {
            SceneContent::Cloud { points, arrows } => {
                checks.expect(points.len() == 5, format!("{} points", points.len()));
                checks.expect(arrows.len() == 4, format!("{} arrows", arrows.len()));
                for p in points {
                    checks.expect(
                        p.position.iter().all(|c| c.is_finite()),
                        "non-finite point position",
                    );
                }
                // One visual identity per token
                let mut colors: Vec<[u8; 4]> = points.iter().map(|p| p.color).collect();
                colors.dedup();
                checks.expect(colors.len() == 5, "palette colors not distinct across 5 tokens");
            }
            SceneContent::NoData => checks.expect(false, "placeholder instead of cloud"),
        }

        self.finish(ScenarioId::FullReveal, &ctx, &engine, events, checks, metrics)
    }

    /// SIM-002: EmptyInput - placeholder scene, zero timers.
    fn run_empty_input(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let mut metrics = ScenarioMetrics::default();
        let mut checks = Checks::new();

        engine.submit(
            AnimationInput::new("", Vec::new(), InputGeometry::Embeddings(Vec::new())),
            ctx.now(),
        );
        metrics.runs_started = 1;

        checks.expect(
            engine.next_deadline().is_none(),
            "timers scheduled for empty input",
        );
        checks.expect(engine.pending_timers() == 0, "pending timers nonzero");
        checks.expect(engine.is_complete(), "empty run not complete");
        let scene = engine.scene(ctx.now());
        metrics.scenes_built += 1;
        checks.expect(scene.is_no_data(), "expected the no-data placeholder");

        self.finish(ScenarioId::EmptyInput, &ctx, &engine, 0, checks, metrics)
    }

    /// SIM-003: NanVector - non-finite entries zeroed before geometry.
    fn run_nan_vector(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let mut oracle = EmbeddingOracle::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut checks = Checks::new();

        let (sentence, tokens) = oracle.sentence(6);
        let mut batch = oracle.embedding_batch(6, 32, 1.0);
        EmbeddingOracle::inject_nan(&mut batch, 2, 3);
        EmbeddingOracle::inject_inf(&mut batch, 4, 10);
        engine.submit(
            AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
            ctx.now(),
        );
        metrics.runs_started = 1;

        let events = self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.is_complete() && e.next_deadline().is_none()
        });

        checks.expect(engine.is_complete(), "run did not complete");
        let scene = engine.scene(ctx.now());
        metrics.scenes_built += 1;
        match &scene.content {
            SceneContent::Cloud { points, arrows } => {
                for p in points {
                    checks.expect(
                        p.position.iter().all(|c| c.is_finite()),
                        "NaN leaked into a point position",
                    );
                }
                for a in arrows {
                    checks.expect(
                        a.vector.iter().all(|c| c.is_finite()),
                        "NaN leaked into an arrow vector",
                    );
                }
            }
            SceneContent::NoData => checks.expect(false, "placeholder instead of cloud"),
        }

        self.finish(ScenarioId::NanVector, &ctx, &engine, events, checks, metrics)
    }

    /// SIM-004: RotationThreshold - active at step 4 of 5, not before.
    fn run_rotation_threshold(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let mut oracle = EmbeddingOracle::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut checks = Checks::new();

        let (sentence, tokens) = oracle.sentence(5);
        let batch = oracle.embedding_batch(5, 64, 1.0);
        engine.submit(
            AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
            ctx.now(),
        );
        metrics.runs_started = 1;

        // Below the threshold the scene must stay static.
        let mut events = self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.state().is_some_and(|s| s.current_step == 3)
        });
        checks.expect(
            !engine.rotation_active(),
            "rotation active at 3/5 (below 0.75 threshold)",
        );

        // 4/5 = 0.8 crosses the threshold on exactly this tick.
        events += self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.state().is_some_and(|s| s.current_step == 4)
        });
        checks.expect(engine.rotation_active(), "rotation not active at 4/5");
        checks.expect(
            engine.state().map(|s| s.phase) == Some(Phase::RotationActive),
            "phase did not upgrade to RotationActive",
        );
        // Activation instant is the tick itself: zero displacement so far.
        checks.expect(
            engine.rotation_angle(ctx.now()).abs() < 1e-9,
            "rotation angle nonzero at activation instant",
        );
        debug!("rotation activated at t={:.3}s", ctx.now().as_secs_f64());

        events += self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.is_complete() && e.next_deadline().is_none()
        });
        checks.expect(
            engine.rotation_active(),
            "rotation deactivated without a reset",
        );
        // Bounded, eased oscillation after activation
        for offset_ms in [50u64, 300, 900, 2700] {
            let angle = engine.rotation_angle(ctx.now() + std::time::Duration::from_millis(offset_ms));
            checks.expect(
                (0.0..=std::f64::consts::FRAC_PI_4 + 1e-12).contains(&angle),
                format!("angle {} out of bounds at +{}ms", angle, offset_ms),
            );
        }

        self.finish(
            ScenarioId::RotationThreshold,
            &ctx,
            &engine,
            events,
            checks,
            metrics,
        )
    }

    /// SIM-005: MidRunRestart - new input at step 2 of 6 resets cleanly.
    fn run_mid_run_restart(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let mut oracle = EmbeddingOracle::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut checks = Checks::new();

        let (sentence, tokens) = oracle.sentence(6);
        let batch = oracle.embedding_batch(6, 16, 1.0);
        engine.submit(
            AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
            ctx.now(),
        );
        metrics.runs_started = 1;

        let mut events = self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.state().is_some_and(|s| s.current_step == 2)
        });
        let old_id = engine.run_id();

        // New input arrives mid-animation.
        let (sentence, tokens) = oracle.sentence(4);
        let batch = oracle.embedding_batch(4, 16, 1.0);
        let new_id = engine.submit(
            AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
            ctx.now(),
        );
        metrics.runs_started += 1;
        metrics.reveal_steps = 0; // fresh run

        checks.expect(Some(new_id) != old_id, "run identity did not change");
        let state = engine.state().cloned();
        checks.expect(
            state.as_ref().map(|s| s.current_step) == Some(0),
            "current_step not zeroed on reset",
        );
        checks.expect(
            state.as_ref().map(|s| s.total_steps) == Some(4),
            "total_steps not rebound to the new input",
        );
        checks.expect(
            engine.pending_timers() == 1,
            format!("{} pending timers after reset", engine.pending_timers()),
        );

        // No frame may reference the discarded run again.
        events += self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.is_complete() && e.next_deadline().is_none()
        });
        let scene = engine.scene(ctx.now());
        metrics.scenes_built += 1;
        checks.expect(scene.run_id == new_id, "scene references the discarded run");
        match &scene.content {
            SceneContent::Cloud { points, .. } => {
                checks.expect(points.len() == 4, format!("{} points after restart", points.len()));
            }
            SceneContent::NoData => checks.expect(false, "placeholder after restart"),
        }
        checks.expect(
            metrics.reveal_steps == 4,
            format!("expected 4 reveal steps after restart, got {}", metrics.reveal_steps),
        );

        self.finish(
            ScenarioId::MidRunRestart,
            &ctx,
            &engine,
            events,
            checks,
            metrics,
        )
    }

    /// SIM-006: DegenerateCloud - coincident points, guarded normalization.
    fn run_degenerate_cloud(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let mut oracle = EmbeddingOracle::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut checks = Checks::new();

        let (sentence, tokens) = oracle.sentence(4);
        let batch = EmbeddingOracle::constant_batch(4, 16, 3.0);
        engine.submit(
            AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
            ctx.now(),
        );
        metrics.runs_started = 1;

        let events = self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.is_complete() && e.next_deadline().is_none()
        });

        checks.expect(engine.is_complete(), "run did not complete");
        let scene = engine.scene(ctx.now());
        metrics.scenes_built += 1;
        match &scene.content {
            SceneContent::Cloud { points, arrows } => {
                checks.expect(points.len() == 4, format!("{} points", points.len()));
                for p in points {
                    checks.expect(
                        p.position.iter().all(|c| c.is_finite()),
                        "non-finite coordinate in degenerate cloud",
                    );
                    checks.expect(
                        p.position == Vector3::zeros(),
                        "coincident cloud did not collapse to the origin",
                    );
                }
                for a in arrows {
                    checks.expect(
                        a.vector.iter().all(|c| c.is_finite()),
                        "non-finite arrow in degenerate cloud",
                    );
                }
            }
            SceneContent::NoData => checks.expect(false, "placeholder instead of cloud"),
        }

        self.finish(
            ScenarioId::DegenerateCloud,
            &ctx,
            &engine,
            events,
            checks,
            metrics,
        )
    }

    /// SIM-007: RestartStorm - rapid repeated restarts never leak timers.
    fn run_restart_storm(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let mut oracle = EmbeddingOracle::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut checks = Checks::new();

        let mut events = 0;
        for round in 0..20 {
            let num_tokens = (round % 5) + 2;
            let (sentence, tokens) = oracle.sentence(num_tokens);
            let batch = oracle.embedding_batch(num_tokens, 24, 1.0);
            engine.submit(
                AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
                ctx.now(),
            );
            metrics.runs_started += 1;

            checks.expect(
                engine.pending_timers() <= 1,
                format!("{} timers pending after restart {}", engine.pending_timers(), round),
            );
            checks.expect(
                engine.state().map(|s| s.total_steps) == Some(num_tokens),
                "state not rebound to the latest input",
            );

            // Let a few deadlines fire before the next restart lands.
            for _ in 0..3 {
                if Self::advance_once(&ctx, &mut engine, &mut metrics) {
                    events += 1;
                }
            }
        }

        // The last run finishes normally.
        events += self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.is_complete() && e.next_deadline().is_none()
        });
        checks.expect(engine.is_complete(), "final run did not complete");
        checks.expect(
            metrics.max_pending_timers <= 1,
            format!("timer queue peaked at {}", metrics.max_pending_timers),
        );
        checks.expect(engine.pending_timers() == 0, "timers left after completion");

        self.finish(
            ScenarioId::RestartStorm,
            &ctx,
            &engine,
            events,
            checks,
            metrics,
        )
    }

    /// SIM-008: LongHaul - 64 tokens, 256 dims, queue hygiene throughout.
    fn run_long_haul(&self) -> ScenarioResult {
        let ctx = SimContext::new(self.seed);
        let mut engine = AnimationEngine::new(EngineConfig::default());
        let mut oracle = EmbeddingOracle::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut checks = Checks::new();

        let (sentence, tokens) = oracle.sentence(64);
        let batch = oracle.embedding_batch(64, 256, 4.0);
        engine.submit(
            AnimationInput::new(sentence, tokens, InputGeometry::Embeddings(batch)),
            ctx.now(),
        );
        metrics.runs_started = 1;

        let events = self.drive_until(&ctx, &mut engine, &mut metrics, &mut checks, |e| {
            e.is_complete() && e.next_deadline().is_none()
        });

        checks.expect(engine.is_complete(), "run did not complete");
        checks.expect(
            metrics.reveal_steps == 64,
            format!("expected 64 reveal steps, got {}", metrics.reveal_steps),
        );
        checks.expect(
            metrics.max_pending_timers <= 1,
            format!("timer queue peaked at {}", metrics.max_pending_timers),
        );
        checks.expect(engine.pending_timers() == 0, "timers left after completion");

        self.finish(ScenarioId::LongHaul, &ctx, &engine, events, checks, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioId;

    #[test]
    fn test_all_scenarios_pass() {
        for scenario in ScenarioId::all() {
            let result = ScenarioRunner::new(42).run(scenario);
            assert!(
                result.passed,
                "{} failed: {:?}",
                scenario.name(),
                result.failure_reason
            );
        }
    }

    #[test]
    fn test_scenarios_deterministic_by_seed() {
        let a = ScenarioRunner::new(7).run(ScenarioId::FullReveal);
        let b = ScenarioRunner::new(7).run(ScenarioId::FullReveal);
        assert_eq!(a.total_events, b.total_events);
        assert_eq!(a.final_time_secs, b.final_time_secs);
        assert_eq!(a.final_step, b.final_step);
    }

    #[test]
    fn test_failure_reason_populated_on_bad_budget() {
        // An absurdly small event budget must fail loudly, not hang.
        let result = ScenarioRunner::new(42)
            .with_event_budget(2)
            .run(ScenarioId::FullReveal);
        assert!(!result.passed);
        assert!(result.failure_reason.is_some());
    }
}
