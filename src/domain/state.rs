//! Observable looper state
//!
//! The (phase, index) pair is the only thing a harness ever sees. It is
//! replaced wholesale on each emission, never merged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of the looper's state machine
///
/// `Idle -> Linear -> Decaying -> Finished`, with `Idle|Finished -> Linear`
/// on a new session and any phase falling back to `Idle` on failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No session has run, or the last one failed
    #[default]
    Idle,
    /// Stepping at the constant linear interval
    Linear,
    /// Stepping toward the stop index with growing delays
    Decaying,
    /// Resting on the stop index
    Finished,
}

impl Phase {
    /// Returns true while a control routine owns the session
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Linear | Phase::Decaying)
    }

    /// Returns true if a new session may be started from this phase
    pub fn accepts_start(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Finished)
    }

    /// Returns true if a decay request is honored from this phase
    pub fn accepts_decay(&self) -> bool {
        matches!(self, Phase::Linear)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Linear => "linear",
            Phase::Decaying => "decaying",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Snapshot of the looper's output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LooperState {
    /// Current phase
    pub phase: Phase,
    /// Current position in `[0, size)`; 0 while idle
    pub current_index: usize,
}

impl LooperState {
    pub fn new(phase: Phase, current_index: usize) -> Self {
        Self {
            phase,
            current_index,
        }
    }

    /// Same index, different phase
    pub fn with_phase(self, phase: Phase) -> Self {
        Self { phase, ..self }
    }

    /// Same phase, different index
    pub fn with_index(self, current_index: usize) -> Self {
        Self {
            current_index,
            ..self
        }
    }
}

impl fmt::Display for LooperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.phase, self.current_index)
    }
}

/// Clamp a caller-supplied index into `[0, size)`.
///
/// Out-of-range indices are pulled to the nearest bound rather than rejected.
/// `size` must be positive.
pub fn clamp_index(index: i64, size: usize) -> usize {
    debug_assert!(size > 0);
    let last = i64::try_from(size - 1).unwrap_or(i64::MAX);
    // bounded by `last`, which came from a usize
    index.clamp(0, last) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle_at_zero() {
        let state = LooperState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn test_phase_predicates() {
        assert!(Phase::Idle.accepts_start());
        assert!(Phase::Finished.accepts_start());
        assert!(!Phase::Linear.accepts_start());
        assert!(!Phase::Decaying.accepts_start());

        assert!(Phase::Linear.accepts_decay());
        assert!(!Phase::Idle.accepts_decay());
        assert!(!Phase::Decaying.accepts_decay());
        assert!(!Phase::Finished.accepts_decay());

        assert!(Phase::Linear.is_running());
        assert!(Phase::Decaying.is_running());
        assert!(!Phase::Finished.is_running());
    }

    #[test]
    fn test_state_builders() {
        let state = LooperState::new(Phase::Linear, 2);
        assert_eq!(state.with_phase(Phase::Decaying), LooperState::new(Phase::Decaying, 2));
        assert_eq!(state.with_index(4), LooperState::new(Phase::Linear, 4));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LooperState::new(Phase::Decaying, 3).to_string(), "decaying@3");
    }

    #[test]
    fn test_state_serializes_lowercase_phase() {
        let json = serde_json::to_string(&LooperState::new(Phase::Finished, 3)).unwrap();
        assert_eq!(json, r#"{"phase":"finished","current_index":3}"#);
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(2, 5), 2);
        assert_eq!(clamp_index(-3, 5), 0);
        assert_eq!(clamp_index(99, 5), 4);
        assert_eq!(clamp_index(i64::MIN, 1), 0);
        assert_eq!(clamp_index(i64::MAX, 1), 0);
    }
}
