//! Core environment context trait for the animation engine.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts the clock so the animation engine can run in both
/// production (tokio) and simulation (virtual clock) environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Simulation**: `SimContext` (in `tokenscope_sim`) - manually advanced
///   virtual clock
///
/// # Determinism
///
/// The reveal sequencer derives every deadline from `now()`, so an
/// implementation with a controlled clock makes entire animation runs
/// reproducible tick for tick.
#[async_trait]
pub trait ScopeContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// All reveal deadlines and tween origins are expressed on this axis.
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock
    async fn sleep(&self, duration: Duration);

    /// Spawns a background task.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the scenario seed.
    fn seed(&self) -> u64;
}
