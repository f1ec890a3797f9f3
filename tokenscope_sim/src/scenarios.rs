//! Animation scenarios for deterministic simulation testing.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// SIM-001: 5 one-hot 768-dim vectors revealed end to end
    FullReveal,

    /// SIM-002: empty token list renders the placeholder, schedules nothing
    EmptyInput,

    /// SIM-003: NaN/Inf entries sanitized before geometry
    NanVector,

    /// SIM-004: rotation activates exactly at the threshold tick
    RotationThreshold,

    /// SIM-005: new input mid-animation resets cleanly
    MidRunRestart,

    /// SIM-006: fully coincident cloud normalizes without dividing by zero
    DegenerateCloud,

    /// SIM-007: rapid repeated restarts never leak timers
    RestartStorm,

    /// SIM-008: large batch, timer-queue hygiene over a long run
    LongHaul,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::FullReveal,
            ScenarioId::EmptyInput,
            ScenarioId::NanVector,
            ScenarioId::RotationThreshold,
            ScenarioId::MidRunRestart,
            ScenarioId::DegenerateCloud,
            ScenarioId::RestartStorm,
            ScenarioId::LongHaul,
        ]
    }

    /// Returns the core acceptance scenarios (not stress).
    pub fn standard() -> Vec<ScenarioId> {
        vec![
            ScenarioId::FullReveal,
            ScenarioId::EmptyInput,
            ScenarioId::NanVector,
            ScenarioId::RotationThreshold,
            ScenarioId::MidRunRestart,
        ]
    }

    /// Returns stress scenarios only.
    pub fn stress() -> Vec<ScenarioId> {
        vec![
            ScenarioId::DegenerateCloud,
            ScenarioId::RestartStorm,
            ScenarioId::LongHaul,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::FullReveal => "full_reveal",
            ScenarioId::EmptyInput => "empty_input",
            ScenarioId::NanVector => "nan_vector",
            ScenarioId::RotationThreshold => "rotation_threshold",
            ScenarioId::MidRunRestart => "mid_run_restart",
            ScenarioId::DegenerateCloud => "degenerate_cloud",
            ScenarioId::RestartStorm => "restart_storm",
            ScenarioId::LongHaul => "long_haul",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::FullReveal => "5 tokens, 768-dim one-hot vectors, full staged reveal",
            ScenarioId::EmptyInput => "Empty token list: placeholder scene, zero timers",
            ScenarioId::NanVector => "NaN and Inf entries zeroed before any bounds math",
            ScenarioId::RotationThreshold => "Rotation turns on at step 4 of 5, not before",
            ScenarioId::MidRunRestart => "New input at step 2 of 6: reset within one tick",
            ScenarioId::DegenerateCloud => "All points coincide; guarded range, no NaN output",
            ScenarioId::RestartStorm => "20 back-to-back restarts; single live run throughout",
            ScenarioId::LongHaul => "64 tokens, 256 dims; queue stays at one pending timer",
        }
    }

    /// Returns true if this is a stress scenario.
    pub fn is_stress(&self) -> bool {
        matches!(
            self,
            ScenarioId::DegenerateCloud | ScenarioId::RestartStorm | ScenarioId::LongHaul
        )
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full_reveal" | "fullreveal" | "sim-001" => Ok(ScenarioId::FullReveal),
            "empty_input" | "emptyinput" | "sim-002" => Ok(ScenarioId::EmptyInput),
            "nan_vector" | "nanvector" | "sim-003" => Ok(ScenarioId::NanVector),
            "rotation_threshold" | "rotation" | "sim-004" => Ok(ScenarioId::RotationThreshold),
            "mid_run_restart" | "restart" | "sim-005" => Ok(ScenarioId::MidRunRestart),
            "degenerate_cloud" | "degenerate" | "sim-006" => Ok(ScenarioId::DegenerateCloud),
            "restart_storm" | "sim-007" => Ok(ScenarioId::RestartStorm),
            "long_haul" | "longhaul" | "sim-008" => Ok(ScenarioId::LongHaul),
            other => Err(format!("unknown scenario: {}", other)),
        }
    }
}
