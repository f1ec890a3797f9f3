//! Tokenscope Core - Projection-and-Sequencing Animation Engine
//!
//! Turns a batch of high-dimensional token embeddings into a progressively
//! revealed, spatially normalized 3D point cloud with connecting arrows and
//! camera motion. Three problems dominate the design:
//! 1. **Arbitrary magnitude**: hidden-state magnitudes vary wildly between
//!    model layers; sanitize → project → normalize maps any batch into a
//!    fixed render volume.
//! 2. **Staged reveal without drift**: one deadline-ordered timer queue
//!    drives a strict Typing → Scanning → Revealing phase machine.
//! 3. **Mid-animation restarts**: run generations gate every timer entry, so
//!    changing the input can never leak a stale mutation into a newer run.

pub mod bounds;
pub mod camera;
pub mod driver;
pub mod engine;
pub mod projection;
pub mod renderer;
pub mod sanitize;
pub mod scheduler;
pub mod sequencer;
pub mod tween;
pub mod upstream;

// Re-export key types for convenience
pub use engine::{AnimationEngine, AnimationInput, EngineConfig, InputGeometry};
pub use renderer::{Scene, SceneContent};
pub use sequencer::{Phase, RevealState};
