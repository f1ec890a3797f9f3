//! JSON exporter for offline replay of animation runs.
//!
//! Captures the scene at each fired deadline so a viewer can scrub through
//! the reveal frame by frame.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use tokenscope_core::sequencer::Phase;
use tokenscope_core::Scene;

/// One captured frame of an animation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFrame {
    /// Virtual time in seconds
    pub time_sec: f64,

    /// The frame's renderable scene
    pub scene: Scene,
}

/// Complete export of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All captured frames
    pub frames: Vec<SceneFrame>,

    /// Final results
    pub passed: bool,

    /// Phase at the end of the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_phase: Option<Phase>,
}

impl AnimationExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            final_phase: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SceneFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, final_phase: Phase) {
        self.passed = passed;
        self.final_phase = Some(final_phase);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
