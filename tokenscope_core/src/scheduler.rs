//! Single timer-queue abstraction with run-generation cancellation.
//!
//! Every pending animation deadline lives in one deadline-ordered queue.
//! Each entry carries the generation of the run that scheduled it, so:
//! - resetting a run is one `cancel_generation` call, not an enumerated
//!   list of timer handles;
//! - a late entry whose generation no longer matches the live run is
//!   dropped at pop time instead of mutating a newer run's state.
//!
//! Entries with equal deadlines pop in scheduling order, which keeps phase
//! transitions strictly sequential even when a simulated clock jumps past
//! several deadlines at once.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;
use tracing::trace;

struct Entry<E> {
    fire_at: Duration,
    seq: u64,
    generation: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // Reversed so the BinaryHeap max-heap pops the earliest deadline first,
    // ties broken by scheduling order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deadline-ordered timer queue shared by all runs of one engine.
pub struct TimerQueue<E> {
    heap: BinaryHeap<Entry<E>>,
    next_seq: u64,
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedules `event` to fire at `fire_at`, owned by `generation`.
    pub fn schedule(&mut self, generation: u64, fire_at: Duration, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            fire_at,
            seq,
            generation,
            event,
        });
    }

    /// Synchronously removes every entry owned by `generation`.
    ///
    /// Returns the number of cancelled entries.
    pub fn cancel_generation(&mut self, generation: u64) -> usize {
        let before = self.heap.len();
        self.heap.retain(|e| e.generation != generation);
        before - self.heap.len()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|e| e.fire_at)
    }

    /// Pops every entry due at or before `now`, in deadline order.
    ///
    /// Entries whose generation differs from `live_generation` are stale
    /// leftovers of a superseded run; they are dropped silently (an expected
    /// race in a cooperative timer model, not an error).
    pub fn pop_due(&mut self, now: Duration, live_generation: u64) -> Vec<(Duration, E)> {
        let mut due = Vec::new();
        while let Some(entry) = self.heap.peek() {
            if entry.fire_at > now {
                break;
            }
            // Peek said there is an entry; pop cannot fail here.
            let Some(entry) = self.heap.pop() else {
                break;
            };
            if entry.generation == live_generation {
                due.push((entry.fire_at, entry.event));
            } else {
                trace!(
                    generation = entry.generation,
                    live = live_generation,
                    "dropping stale timer"
                );
            }
        }
        due
    }

    /// Number of pending entries.
    pub fn pending(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
