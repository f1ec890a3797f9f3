//! Tokenscope Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the animation
//! engine to run in both **Production** (tokio) and **Simulation**
//! (virtual clock) environments.
//!
//! # Core Concept
//!
//! The engine never reads the wall clock or schedules OS timers directly.
//! All suspension goes through a [`ScopeContext`]:
//! - Time (`now()`, `sleep()`)
//! - Task spawning (`spawn()`)
//!
//! In production the context wraps `tokio::time`; in the simulation harness
//! a virtual clock advances instantly to the next deadline, so every reveal
//! sequence is reproducible from its seed.
//!
//! # Example
//!
//! ```ignore
//! use tokenscope_env::ScopeContext;
//!
//! async fn animation_loop<Ctx: ScopeContext>(ctx: &Ctx) {
//!     loop {
//!         ctx.sleep(Duration::from_millis(25)).await;
//!         tick(ctx.now());
//!     }
//! }
//! ```

mod context;
mod tokio_impl;

pub use context::ScopeContext;
pub use tokio_impl::TokioContext;
