//! Run lifecycle of a panel

use serde::{Deserialize, Serialize};

/// Where a panel is in its current (or last) run
///
/// A fresh panel is `Unstarted`; a run walks `Validating` →
/// `Running(layer)` → `Reducing` → `Complete`, and `Failed` is reachable
/// from any non-complete state. Re-running a panel resets it to the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunState {
    #[default]
    Unstarted,
    Validating,
    /// Invoking the agents of the given layer
    Running(usize),
    /// Invoking the moderator over the sink outputs
    Reducing,
    Complete,
    Failed,
}

impl RunState {
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Unstarted => "unstarted",
            RunState::Validating => "validating",
            RunState::Running(_) => "running",
            RunState::Reducing => "reducing",
            RunState::Complete => "complete",
            RunState::Failed => "failed",
        }
    }

    /// Whether the run has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Complete | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Running(layer) => write!(f, "running(layer {})", layer),
            other => write!(f, "{}", other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unstarted() {
        assert_eq!(RunState::default(), RunState::Unstarted);
        assert!(!RunState::Unstarted.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Complete.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Running(3).is_terminal());
        assert!(!RunState::Reducing.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(RunState::Running(2).to_string(), "running(layer 2)");
        assert_eq!(RunState::Reducing.to_string(), "reducing");
    }
}
