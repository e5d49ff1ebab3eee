//! Pipeline state management

/// Pipeline state machine
///
/// Exactly one instance exists per publisher. Transitions are validated so
/// that `Running` can only follow `Initialized`, and `TornDown` is reachable
/// from any state exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No resources acquired yet
    Uninitialized,

    /// Streams registered, sink opened, header written
    Initialized,

    /// The publishing thread is consuming the queue
    Running,

    /// The publishing thread has exited and was joined
    Stopped,

    /// All resources released; terminal
    TornDown,
}

impl PipelineState {
    /// Check if this state transition is valid
    pub fn can_transition_to(&self, target: &PipelineState) -> bool {
        use PipelineState::*;

        match (self, target) {
            // Terminal: nothing leaves TornDown
            (TornDown, _) => false,

            // Teardown is reachable from every other state
            (_, TornDown) => true,

            (Uninitialized, Initialized) => true,
            (Initialized, Running) => true,
            (Running, Stopped) => true,

            // Self-transitions model redundant calls (no-ops with a warning)
            (a, b) if a == b => true,

            _ => false,
        }
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            PipelineState::Uninitialized => "Uninitialized",
            PipelineState::Initialized => "Initialized",
            PipelineState::Running => "Running",
            PipelineState::Stopped => "Stopped",
            PipelineState::TornDown => "TornDown",
        }
    }

    /// Check if the publishing thread is running
    pub fn is_running(&self) -> bool {
        matches!(self, PipelineState::Running)
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn test_valid_transitions() {
        assert!(Uninitialized.can_transition_to(&Initialized));
        assert!(Initialized.can_transition_to(&Running));
        assert!(Running.can_transition_to(&Stopped));

        // Teardown from anywhere
        assert!(Uninitialized.can_transition_to(&TornDown));
        assert!(Initialized.can_transition_to(&TornDown));
        assert!(Running.can_transition_to(&TornDown));
        assert!(Stopped.can_transition_to(&TornDown));

        // Self-transitions
        assert!(Initialized.can_transition_to(&Initialized));
        assert!(Running.can_transition_to(&Running));
    }

    #[test]
    fn test_invalid_transitions() {
        // Must initialize before running
        assert!(!Uninitialized.can_transition_to(&Running));
        // No restart after stop
        assert!(!Stopped.can_transition_to(&Running));
        assert!(!Stopped.can_transition_to(&Initialized));
        // Teardown is terminal, even to itself
        assert!(!TornDown.can_transition_to(&TornDown));
        assert!(!TornDown.can_transition_to(&Uninitialized));
    }
}
