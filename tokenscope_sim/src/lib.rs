//! Tokenscope Deterministic Simulation Harness
//!
//! Runs the animation engine in a controlled environment where every source
//! of non-determinism is intercepted:
//! - **Time**: a virtual clock advances straight to the next timer deadline
//! - **Inputs**: sentences, tokens, and embedding matrices derive from a
//!   single 64-bit seed
//!
//! Any reveal-sequence bug becomes reproducible via its seed number.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                   ScenarioRunner                      │
//! │  ┌─────────────┐   deadlines   ┌──────────────────┐   │
//! │  │ SimContext  │◄──────────────│ AnimationEngine  │   │
//! │  │ (virtual    │──────────────►│ (timer queue +   │   │
//! │  │  clock)     │   tick(now)   │  reveal FSM)     │   │
//! │  └─────────────┘               └──────────────────┘   │
//! │        ▲                                ▲             │
//! │  ┌─────┴────────────────────────────────┴─────┐       │
//! │  │             EmbeddingOracle                │       │
//! │  │   (seeded sentences + embedding batches)   │       │
//! │  └────────────────────────────────────────────┘       │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tokenscope_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::FullReveal);
//! assert!(result.passed);
//! ```

mod context;
mod exporter;
mod oracle;
mod runner;
pub mod scenarios;

pub use context::SimContext;
pub use exporter::{AnimationExport, SceneFrame};
pub use oracle::EmbeddingOracle;
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
