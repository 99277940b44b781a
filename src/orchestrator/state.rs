//! Build State Management and Phase Tracking
//!
//! - `BuildPhaseState`: discrete phases of one run
//! - `OrchestrationState`: current phase, completed phases and failure reason
//!
//! Transitions are strictly linear; `Failed` is terminal for the run.

use std::time::{Duration, Instant};

/// Build phase enumeration - discrete states in the build lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildPhaseState {
    /// Phase 1: build directory reset, toolchain env and flag derivation
    Preparation,

    /// Phase 2: cmake configure
    Configuration,

    /// Phase 3: make
    Building,

    /// Phase 4: make install
    Installation,

    /// Build completed successfully
    Completed,

    /// Build failed; build directory left in place for inspection
    Failed,
}

impl BuildPhaseState {
    /// Get the human-readable name for this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildPhaseState::Preparation => "preparation",
            BuildPhaseState::Configuration => "configuration",
            BuildPhaseState::Building => "building",
            BuildPhaseState::Installation => "installation",
            BuildPhaseState::Completed => "completed",
            BuildPhaseState::Failed => "failed",
        }
    }

    /// Get all valid phase transitions FROM this phase.
    pub fn valid_next_phases(&self) -> Vec<BuildPhaseState> {
        match self {
            BuildPhaseState::Preparation => vec![BuildPhaseState::Configuration, BuildPhaseState::Failed],
            BuildPhaseState::Configuration => vec![BuildPhaseState::Building, BuildPhaseState::Failed],
            BuildPhaseState::Building => vec![
                BuildPhaseState::Installation,
                BuildPhaseState::Completed,
                BuildPhaseState::Failed,
            ],
            BuildPhaseState::Installation => vec![BuildPhaseState::Completed, BuildPhaseState::Failed],
            BuildPhaseState::Completed => vec![],
            BuildPhaseState::Failed => vec![],
        }
    }

    /// Check if a transition to the given phase is valid.
    pub fn can_transition_to(&self, next: BuildPhaseState) -> bool {
        self.valid_next_phases().contains(&next)
    }
}

/// Progress of a single run.
#[derive(Debug, Clone)]
pub struct OrchestrationState {
    pub phase: BuildPhaseState,

    /// Phases finished successfully, in order
    pub completed: Vec<BuildPhaseState>,

    pub start_time: Instant,

    /// Error message if a phase failed
    pub error: Option<String>,
}

impl OrchestrationState {
    pub fn new() -> Self {
        OrchestrationState {
            phase: BuildPhaseState::Preparation,
            completed: Vec::new(),
            start_time: Instant::now(),
            error: None,
        }
    }

    /// Mark the current phase done and move to `next_phase`.
    pub fn transition_to(&mut self, next_phase: BuildPhaseState) -> Result<(), String> {
        if !self.phase.can_transition_to(next_phase) {
            return Err(format!(
                "Invalid phase transition: {} -> {}",
                self.phase.as_str(),
                next_phase.as_str()
            ));
        }
        self.completed.push(self.phase);
        log::debug!("[Orchestrator] Phase {} -> {}", self.phase.as_str(), next_phase.as_str());
        self.phase = next_phase;
        Ok(())
    }

    /// Record an error and mark phase as failed.
    pub fn record_error(&mut self, error: String) {
        self.error = Some(error);
        self.phase = BuildPhaseState::Failed;
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for OrchestrationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        assert!(BuildPhaseState::Preparation.can_transition_to(BuildPhaseState::Configuration));
        assert!(!BuildPhaseState::Preparation.can_transition_to(BuildPhaseState::Building));
        assert!(BuildPhaseState::Building.can_transition_to(BuildPhaseState::Completed));
        assert!(BuildPhaseState::Failed.valid_next_phases().is_empty());
    }

    #[test]
    fn test_transition_records_completed_phase() {
        let mut state = OrchestrationState::new();
        state.transition_to(BuildPhaseState::Configuration).unwrap();
        state.transition_to(BuildPhaseState::Building).unwrap();
        assert_eq!(
            state.completed,
            vec![BuildPhaseState::Preparation, BuildPhaseState::Configuration]
        );
        assert_eq!(state.phase, BuildPhaseState::Building);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut state = OrchestrationState::new();
        let err = state.transition_to(BuildPhaseState::Installation).unwrap_err();
        assert_eq!(err, "Invalid phase transition: preparation -> installation");
        assert!(state.completed.is_empty());
    }

    #[test]
    fn test_record_error_marks_failed() {
        let mut state = OrchestrationState::new();
        state.record_error("cmake failed".to_string());
        assert_eq!(state.phase, BuildPhaseState::Failed);
        assert_eq!(state.error.as_deref(), Some("cmake failed"));
    }
}
