//! Session data types

/// Lifecycle state of a live recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Built but capture not yet started
    #[default]
    Idle,
    /// Capture running, events flowing
    Recording,
    /// Stopped; terminal
    Stopped,
}

impl SessionState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording)
    }

    /// Check if stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, SessionState::Stopped)
    }
}

/// Result of evaluating activity against the inactivity timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityOutcome {
    /// Session still valid
    Continued,
    /// Session had expired and was replaced
    Reset { previous: String, current: String },
}

impl ActivityOutcome {
    pub fn is_reset(&self) -> bool {
        matches!(self, ActivityOutcome::Reset { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state() {
        assert!(SessionState::Recording.is_recording());
        assert!(SessionState::Stopped.is_stopped());
        assert!(!SessionState::Idle.is_recording());
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn test_activity_outcome() {
        assert!(!ActivityOutcome::Continued.is_reset());
        assert!(ActivityOutcome::Reset {
            previous: "a".into(),
            current: "b".into()
        }
        .is_reset());
    }
}
