//! The reveal sequencer - a timer-driven finite-state machine.
//!
//! One instance per animation run. It owns the run's [`RevealState`]; the
//! renderer and rotation controller read that state and never write it.
//!
//! Phase order is strict: Typing fully completes before Scanning begins,
//! Scanning before Revealing. Every deadline is scheduled through the shared
//! [`TimerQueue`] under the owning run's generation, so resetting a run
//! cancels the whole chain in one call and a late tick from a superseded
//! run is a no-op.

use crate::scheduler::TimerQueue;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

/// Animation phases in order of progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No run started, or a run was just reset
    Idle,
    /// Character-by-character reveal of the raw input text
    Typing,
    /// Token-by-token highlight with a per-token processing dwell
    Scanning,
    /// Step-by-step reveal of points and arrows
    Revealing,
    /// Still revealing, past the rotation threshold fraction
    RotationActive,
    /// All steps revealed; no further automatic mutation
    Complete,
}

/// Timer events consumed by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Reveal the next character of the input text
    TypeChar,
    /// Typing finished and its pause elapsed; enter Scanning
    BeginScanning,
    /// Highlight the next token
    ScanToken,
    /// Scanning finished and its pause elapsed; enter Revealing
    BeginRevealing,
    /// Reveal the next point/arrow
    RevealStep,
}

/// Reveal progress for one animation run.
///
/// Mutated only by [`RevealSequencer`]; everything else treats it as
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealState {
    pub phase: Phase,
    /// Number of points/arrows currently revealed
    pub current_step: usize,
    /// Equals the token count of the run
    pub total_steps: usize,
    pub chars_revealed: usize,
    pub total_chars: usize,
    pub tokens_scanned: usize,
}

impl RevealState {
    fn new(total_chars: usize, total_steps: usize) -> Self {
        Self {
            phase: Phase::Idle,
            current_step: 0,
            total_steps,
            chars_revealed: 0,
            total_chars,
            tokens_scanned: 0,
        }
    }

    /// Fraction of reveal steps completed, in [0, 1].
    ///
    /// An empty run counts as fully revealed so completion gating in the
    /// host still fires.
    pub fn fraction(&self) -> f64 {
        if self.total_steps == 0 {
            1.0
        } else {
            self.current_step as f64 / self.total_steps as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}

/// Timing constants for the reveal sequence.
///
/// These are hand-tuned presentation values, kept as configuration rather
/// than literals scattered through the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Delay between revealed characters while Typing
    pub char_interval: Duration,
    /// Pause between the last character and Scanning
    pub typing_pause: Duration,
    /// Delay between token highlights while Scanning
    pub scan_interval: Duration,
    /// Extra per-token dwell representing processing at an intermediate
    /// layer
    pub scan_hold: Duration,
    /// Pause between the last token highlight and Revealing
    pub scan_pause: Duration,
    /// Delay between reveal steps
    pub reveal_interval: Duration,
    /// Reveal fraction at which the phase upgrades to RotationActive
    pub rotation_threshold: f64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            char_interval: Duration::from_millis(25),
            typing_pause: Duration::from_millis(400),
            scan_interval: Duration::from_millis(220),
            scan_hold: Duration::from_millis(120),
            scan_pause: Duration::from_millis(500),
            reveal_interval: Duration::from_millis(200),
            rotation_threshold: 0.75,
        }
    }
}

/// Drives one run's `RevealState` through the phase machine.
pub struct RevealSequencer {
    config: SequencerConfig,
    state: RevealState,
}

impl RevealSequencer {
    /// Creates a sequencer for one sentence and its token count.
    pub fn new(config: SequencerConfig, sentence: &str, num_tokens: usize) -> Self {
        Self {
            config,
            state: RevealState::new(sentence.chars().count(), num_tokens),
        }
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    /// Starts the run: Idle → Typing, scheduling the first deadline.
    ///
    /// An empty run (no tokens) completes immediately and schedules nothing,
    /// leaving the scene on its no-data placeholder.
    pub fn start(&mut self, generation: u64, now: Duration, queue: &mut TimerQueue<SequencerEvent>) {
        if self.state.total_steps == 0 {
            self.state.phase = Phase::Complete;
            debug!("no tokens to reveal; run completes immediately");
            return;
        }
        self.state.phase = Phase::Typing;
        debug!(
            chars = self.state.total_chars,
            tokens = self.state.total_steps,
            "entering Typing"
        );
        if self.state.total_chars == 0 {
            queue.schedule(generation, now + self.config.typing_pause, SequencerEvent::BeginScanning);
        } else {
            queue.schedule(generation, now + self.config.char_interval, SequencerEvent::TypeChar);
        }
    }

    /// Applies one timer event that fired at `at`.
    ///
    /// Follow-up deadlines are scheduled relative to `at`, not to the time
    /// the event was processed, so a clock that jumps past several deadlines
    /// replays them without drift. Events that do not match the current
    /// phase are skipped rather than panicking.
    pub fn handle(
        &mut self,
        event: SequencerEvent,
        at: Duration,
        generation: u64,
        queue: &mut TimerQueue<SequencerEvent>,
    ) {
        match event {
            SequencerEvent::TypeChar => self.on_type_char(at, generation, queue),
            SequencerEvent::BeginScanning => self.on_begin_scanning(at, generation, queue),
            SequencerEvent::ScanToken => self.on_scan_token(at, generation, queue),
            SequencerEvent::BeginRevealing => self.on_begin_revealing(at, generation, queue),
            SequencerEvent::RevealStep => self.on_reveal_step(at, generation, queue),
        }
    }

    fn on_type_char(&mut self, at: Duration, generation: u64, queue: &mut TimerQueue<SequencerEvent>) {
        if self.state.phase != Phase::Typing {
            trace!(phase = ?self.state.phase, "TypeChar outside Typing; skipping");
            return;
        }
        self.state.chars_revealed = (self.state.chars_revealed + 1).min(self.state.total_chars);
        if self.state.chars_revealed < self.state.total_chars {
            queue.schedule(generation, at + self.config.char_interval, SequencerEvent::TypeChar);
        } else {
            queue.schedule(generation, at + self.config.typing_pause, SequencerEvent::BeginScanning);
        }
    }

    fn on_begin_scanning(
        &mut self,
        at: Duration,
        generation: u64,
        queue: &mut TimerQueue<SequencerEvent>,
    ) {
        if self.state.phase != Phase::Typing {
            trace!(phase = ?self.state.phase, "BeginScanning outside Typing; skipping");
            return;
        }
        self.state.phase = Phase::Scanning;
        debug!(tokens = self.state.total_steps, "entering Scanning");
        queue.schedule(generation, at + self.config.scan_interval, SequencerEvent::ScanToken);
    }

    fn on_scan_token(&mut self, at: Duration, generation: u64, queue: &mut TimerQueue<SequencerEvent>) {
        if self.state.phase != Phase::Scanning {
            trace!(phase = ?self.state.phase, "ScanToken outside Scanning; skipping");
            return;
        }
        self.state.tokens_scanned = (self.state.tokens_scanned + 1).min(self.state.total_steps);
        if self.state.tokens_scanned < self.state.total_steps {
            let dwell = self.config.scan_interval + self.config.scan_hold;
            queue.schedule(generation, at + dwell, SequencerEvent::ScanToken);
        } else {
            queue.schedule(generation, at + self.config.scan_pause, SequencerEvent::BeginRevealing);
        }
    }

    fn on_begin_revealing(
        &mut self,
        at: Duration,
        generation: u64,
        queue: &mut TimerQueue<SequencerEvent>,
    ) {
        if self.state.phase != Phase::Scanning {
            trace!(phase = ?self.state.phase, "BeginRevealing outside Scanning; skipping");
            return;
        }
        self.state.phase = Phase::Revealing;
        debug!("entering Revealing");
        queue.schedule(generation, at + self.config.reveal_interval, SequencerEvent::RevealStep);
    }

    fn on_reveal_step(&mut self, at: Duration, generation: u64, queue: &mut TimerQueue<SequencerEvent>) {
        if self.state.phase != Phase::Revealing && self.state.phase != Phase::RotationActive {
            trace!(phase = ?self.state.phase, "RevealStep outside Revealing; skipping");
            return;
        }
        if self.state.current_step >= self.state.total_steps {
            // Already complete; increments are idempotent past the end.
            return;
        }
        self.state.current_step += 1;
        if self.state.phase == Phase::Revealing
            && self.state.fraction() >= self.config.rotation_threshold
        {
            self.state.phase = Phase::RotationActive;
            debug!(step = self.state.current_step, "rotation threshold crossed");
        }
        if self.state.current_step == self.state.total_steps {
            self.state.phase = Phase::Complete;
            debug!(steps = self.state.total_steps, "reveal complete");
        } else {
            queue.schedule(generation, at + self.config.reveal_interval, SequencerEvent::RevealStep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEN: u64 = 1;

    fn quick_config() -> SequencerConfig {
        SequencerConfig {
            char_interval: Duration::from_millis(10),
            typing_pause: Duration::from_millis(40),
            scan_interval: Duration::from_millis(20),
            scan_hold: Duration::from_millis(5),
            scan_pause: Duration::from_millis(50),
            reveal_interval: Duration::from_millis(30),
            rotation_threshold: 0.75,
        }
    }

    /// Drains the queue deadline by deadline until nothing is pending.
    /// Returns the sequence of (step, phase) snapshots after each event.
    fn drain(
        seq: &mut RevealSequencer,
        queue: &mut TimerQueue<SequencerEvent>,
    ) -> Vec<(usize, Phase)> {
        let mut snapshots = Vec::new();
        let mut guard = 0;
        while let Some(deadline) = queue.next_deadline() {
            guard += 1;
            assert!(guard < 10_000, "timer chain did not terminate");
            for (at, event) in queue.pop_due(deadline, GEN) {
                seq.handle(event, at, GEN, queue);
                snapshots.push((seq.state().current_step, seq.state().phase));
            }
        }
        snapshots
    }

    #[test]
    fn test_empty_run_completes_without_timers() {
        let mut queue = TimerQueue::new();
        let mut seq = RevealSequencer::new(quick_config(), "", 0);
        seq.start(GEN, Duration::ZERO, &mut queue);

        assert_eq!(seq.state().phase, Phase::Complete);
        assert!(seq.state().is_complete());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_phase_order_is_strict() {
        let mut queue = TimerQueue::new();
        let mut seq = RevealSequencer::new(quick_config(), "hi there", 3);
        seq.start(GEN, Duration::ZERO, &mut queue);
        assert_eq!(seq.state().phase, Phase::Typing);

        let snapshots = drain(&mut seq, &mut queue);
        // Phases only ever move forward.
        let order = |p: Phase| match p {
            Phase::Idle => 0,
            Phase::Typing => 1,
            Phase::Scanning => 2,
            Phase::Revealing => 3,
            Phase::RotationActive => 4,
            Phase::Complete => 5,
        };
        let mut prev = order(Phase::Typing);
        for (_, phase) in &snapshots {
            assert!(order(*phase) >= prev, "phase regressed to {:?}", phase);
            prev = order(*phase);
        }
        assert_eq!(seq.state().phase, Phase::Complete);
        assert_eq!(seq.state().chars_revealed, 8);
        assert_eq!(seq.state().tokens_scanned, 3);
    }

    #[test]
    fn test_steps_increment_by_exactly_one() {
        let mut queue = TimerQueue::new();
        let mut seq = RevealSequencer::new(quick_config(), "five token test run", 5);
        seq.start(GEN, Duration::ZERO, &mut queue);

        let snapshots = drain(&mut seq, &mut queue);
        let steps: Vec<usize> = snapshots.iter().map(|(s, _)| *s).collect();
        for pair in steps.windows(2) {
            assert!(pair[1] == pair[0] || pair[1] == pair[0] + 1, "step skipped");
        }
        assert_eq!(seq.state().current_step, 5);
        // Exactly 5 reveal ticks changed the step.
        let reveal_ticks = steps.windows(2).filter(|p| p[1] == p[0] + 1).count()
            + usize::from(steps.first() == Some(&1));
        assert_eq!(reveal_ticks, 5);
    }

    #[test]
    fn test_rotation_threshold_crossed_at_exact_tick() {
        let mut queue = TimerQueue::new();
        let mut seq = RevealSequencer::new(quick_config(), "12345", 5);
        seq.start(GEN, Duration::ZERO, &mut queue);

        let snapshots = drain(&mut seq, &mut queue);
        // 4/5 = 0.8 is the first fraction >= 0.75
        for (step, phase) in &snapshots {
            match *step {
                0..=3 => assert_ne!(*phase, Phase::RotationActive),
                4 => {
                    if *phase != Phase::Complete {
                        assert_eq!(*phase, Phase::RotationActive);
                    }
                }
                _ => {}
            }
        }
        let first_active = snapshots
            .iter()
            .find(|(_, p)| *p == Phase::RotationActive)
            .map(|(s, _)| *s);
        assert_eq!(first_active, Some(4));
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut queue = TimerQueue::new();
        let mut seq = RevealSequencer::new(quick_config(), "ab", 2);
        seq.start(GEN, Duration::ZERO, &mut queue);
        drain(&mut seq, &mut queue);
        assert_eq!(seq.state().phase, Phase::Complete);
        assert_eq!(seq.state().current_step, 2);

        // A straggler reveal tick must not move the state.
        seq.handle(
            SequencerEvent::RevealStep,
            Duration::from_secs(10),
            GEN,
            &mut queue,
        );
        assert_eq!(seq.state().current_step, 2);
        assert_eq!(seq.state().phase, Phase::Complete);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_out_of_phase_events_are_skipped() {
        let mut queue = TimerQueue::new();
        let mut seq = RevealSequencer::new(quick_config(), "abc", 2);
        seq.start(GEN, Duration::ZERO, &mut queue);

        // Still Typing; a reveal tick is out of order and must be ignored.
        seq.handle(SequencerEvent::RevealStep, Duration::ZERO, GEN, &mut queue);
        assert_eq!(seq.state().current_step, 0);
        assert_eq!(seq.state().phase, Phase::Typing);
    }

    #[test]
    fn test_empty_sentence_still_reveals_tokens() {
        let mut queue = TimerQueue::new();
        let mut seq = RevealSequencer::new(quick_config(), "", 2);
        seq.start(GEN, Duration::ZERO, &mut queue);
        assert_eq!(seq.state().phase, Phase::Typing);

        drain(&mut seq, &mut queue);
        assert_eq!(seq.state().phase, Phase::Complete);
        assert_eq!(seq.state().current_step, 2);
    }

    #[test]
    fn test_fraction() {
        let mut state = RevealState::new(0, 4);
        assert_eq!(state.fraction(), 0.0);
        state.current_step = 3;
        assert_eq!(state.fraction(), 0.75);

        let empty = RevealState::new(0, 0);
        assert_eq!(empty.fraction(), 1.0);
    }

    #[test]
    fn test_at_most_one_pending_timer() {
        // The chain schedules exactly one successor per event; the queue can
        // never accumulate deadlines for a healthy run.
        let mut queue = TimerQueue::new();
        let mut seq = RevealSequencer::new(quick_config(), "some words here", 4);
        seq.start(GEN, Duration::ZERO, &mut queue);

        let mut guard = 0;
        while let Some(deadline) = queue.next_deadline() {
            guard += 1;
            assert!(guard < 10_000);
            assert!(queue.pending() <= 1);
            for (at, event) in queue.pop_due(deadline, GEN) {
                seq.handle(event, at, GEN, &mut queue);
            }
        }
        assert!(seq.state().is_complete());
    }
}
