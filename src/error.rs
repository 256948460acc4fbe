//! Error types for the decay looper
//!
//! Centralized error handling using thiserror. Commands never surface these;
//! they show up at construction time and inside the control routine.

use std::time::Duration;

use thiserror::Error;

/// All error types that can occur in the decay looper
#[derive(Debug, Error)]
pub enum LooperError {
    /// Construction parameters violate the looper's invariants
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The decay growth rule produced a zero increment
    #[error("Decay growth must be positive (got zero increment at {interval:?})")]
    NonPositiveGrowth { interval: Duration },

    /// No tokio runtime to run sessions on
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    /// Session state is inconsistent with the running routine
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The owning scope was torn down
    #[error("Session cancelled")]
    Cancelled,

    /// A newer session replaced the one this routine was driving
    #[error("Session {0} superseded")]
    Superseded(u64),
}

impl LooperError {
    /// Returns true for the exits that must leave session state untouched
    pub fn is_cooperative(&self) -> bool {
        matches!(self, LooperError::Cancelled | LooperError::Superseded(_))
    }
}

/// Result type alias for looper operations
pub type Result<T> = std::result::Result<T, LooperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_error() {
        let err = LooperError::InvalidConfig("linear interval must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid config: linear interval must be positive");
    }

    #[test]
    fn test_non_positive_growth_error() {
        let err = LooperError::NonPositiveGrowth {
            interval: Duration::from_millis(100),
        };
        assert!(err.to_string().contains("100ms"));
    }

    #[test]
    fn test_invalid_state_error() {
        let err = LooperError::InvalidState("decaying without a stop index".to_string());
        assert_eq!(err.to_string(), "Invalid state: decaying without a stop index");
    }

    #[test]
    fn test_superseded_error() {
        let err = LooperError::Superseded(7);
        assert_eq!(err.to_string(), "Session 7 superseded");
    }

    #[test]
    fn test_cooperative_exits() {
        assert!(LooperError::Cancelled.is_cooperative());
        assert!(LooperError::Superseded(1).is_cooperative());
        assert!(!LooperError::InvalidState("x".into()).is_cooperative());
        assert!(!LooperError::NonPositiveGrowth { interval: Duration::ZERO }.is_cooperative());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<usize> {
            Ok(3)
        }

        fn returns_err() -> Result<usize> {
            Err(LooperError::Cancelled)
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
