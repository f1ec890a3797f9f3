//! Async driver running an engine against a [`ScopeContext`] clock.
//!
//! The engine itself is synchronous and timer-queue based; this loop is the
//! only place that actually sleeps. In production the context wraps tokio
//! time; the simulation harness advances a virtual clock instead and never
//! sleeps for real.

use crate::engine::AnimationEngine;
use std::sync::Arc;
use tokenscope_env::ScopeContext;
use tracing::debug;

/// Sleeps to each pending deadline in turn until the run completes or the
/// queue drains.
pub async fn drive_to_completion<C: ScopeContext>(ctx: &C, engine: &mut AnimationEngine) {
    loop {
        if engine.is_complete() {
            debug!("drive loop: run complete");
            return;
        }
        let Some(deadline) = engine.next_deadline() else {
            debug!("drive loop: no pending deadlines");
            return;
        };
        let now = ctx.now();
        if deadline > now {
            ctx.sleep(deadline - now).await;
        }
        engine.tick(ctx.now());
    }
}

/// Fire-and-forget: drives a run to completion on a background task.
///
/// The engine is consumed; hosts that need to keep querying the scene use
/// [`drive_to_completion`] or [`step`] on their own task instead.
pub fn spawn_drive<C: ScopeContext>(ctx: Arc<C>, mut engine: AnimationEngine) {
    let task_ctx = Arc::clone(&ctx);
    ctx.spawn("animation-drive", async move {
        drive_to_completion(task_ctx.as_ref(), &mut engine).await;
    });
}

/// Fires at most one pending deadline; returns false when nothing is left
/// to do. Lets a host interleave its own work between animation steps.
pub async fn step<C: ScopeContext>(ctx: &C, engine: &mut AnimationEngine) -> bool {
    if engine.is_complete() {
        return false;
    }
    let Some(deadline) = engine.next_deadline() else {
        return false;
    };
    let now = ctx.now();
    if deadline > now {
        ctx.sleep(deadline - now).await;
    }
    engine.tick(ctx.now());
    true
}
