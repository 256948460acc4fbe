//! Decay schedule generation
//!
//! Two pure pieces: the growing delay sequence used while decelerating, and
//! the number of constant-speed padding steps needed so the last decay step
//! lands exactly on the stop index.

use std::iter;
use std::time::Duration;

use crate::decay::DecayGrowth;
use crate::error::{LooperError, Result};

/// Generate the delays used while decelerating.
///
/// Starting from `linear_interval`, the delay grows by `growth` each step and
/// is kept while it stays within `max_interval`. The first delay past the
/// bound ends the sequence and is not included. A zero increment is an error
/// since the sequence would never end.
pub fn decay_intervals(
    linear_interval: Duration,
    max_interval: Duration,
    growth: &DecayGrowth,
) -> Result<Vec<Duration>> {
    let mut intervals = Vec::new();
    let mut interval = linear_interval;

    loop {
        let increment = growth.increment(interval);
        if increment.is_zero() {
            return Err(LooperError::NonPositiveGrowth { interval });
        }

        interval = match interval.checked_add(increment) {
            Some(next) if next <= max_interval => next,
            _ => break,
        };
        intervals.push(interval);
    }

    Ok(intervals)
}

/// Number of linear steps to run before the decay sequence starts.
///
/// Advancing `pad + decay_count` steps from `current_index` (mod `size`) ends
/// on `stop_index`. Always in `[0, size)`.
pub fn pad_steps(size: usize, decay_count: usize, current_index: usize, stop_index: usize) -> usize {
    debug_assert!(size > 0);
    debug_assert!(current_index < size && stop_index < size);

    let projected = (current_index + decay_count % size) % size;
    if projected <= stop_index {
        stop_index - projected
    } else {
        size - (projected - stop_index)
    }
}

/// Full stepping plan from the moment decay begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecayPlan {
    /// Linear-speed steps before the decay sequence
    pub pad_steps: usize,
    /// Growing delays, one step each
    pub intervals: Vec<Duration>,
    /// Index the plan comes to rest on
    pub stop_index: usize,
}

impl DecayPlan {
    /// Plan the remaining steps of a session.
    ///
    /// With an empty delay sequence there is nothing to align, so no padding
    /// is planned and the looper snaps straight to `stop_index`.
    pub fn new(size: usize, current_index: usize, stop_index: usize, intervals: Vec<Duration>) -> Self {
        let pad_steps = if intervals.is_empty() {
            0
        } else {
            pad_steps(size, intervals.len(), current_index, stop_index)
        };

        Self {
            pad_steps,
            intervals,
            stop_index,
        }
    }

    /// True when the looper should jump to the stop index without stepping
    pub fn is_snap(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn total_steps(&self) -> usize {
        self.pad_steps + self.intervals.len()
    }

    /// Per-step delays in execution order.
    pub fn delays(&self, linear_interval: Duration) -> impl Iterator<Item = Duration> + '_ {
        iter::repeat_n(linear_interval, self.pad_steps).chain(self.intervals.iter().copied())
    }

    /// Time from the first padding step to rest.
    pub fn total_duration(&self, linear_interval: Duration) -> Duration {
        self.delays(linear_interval).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn test_default_sequence() {
        let intervals = decay_intervals(
            Duration::from_millis(100),
            Duration::from_millis(1000),
            &DecayGrowth::proportional(0.3),
        )
        .unwrap();
        assert_eq!(intervals, ms(&[130, 169, 219, 284, 369, 479, 622, 808]));
    }

    #[test]
    fn test_sequence_is_increasing_and_bounded() {
        let max = Duration::from_millis(5000);
        let intervals = decay_intervals(Duration::from_millis(40), max, &DecayGrowth::proportional(0.15)).unwrap();
        assert!(!intervals.is_empty());
        assert!(intervals.windows(2).all(|w| w[0] < w[1]));
        assert!(intervals.iter().all(|d| *d <= max));
    }

    #[test]
    fn test_sequence_keeps_exact_bound() {
        let intervals = decay_intervals(
            Duration::from_millis(100),
            Duration::from_millis(300),
            &DecayGrowth::constant(Duration::from_millis(100)),
        )
        .unwrap();
        assert_eq!(intervals, ms(&[200, 300]));
    }

    #[test]
    fn test_sequence_empty_when_first_growth_exceeds_max() {
        let intervals = decay_intervals(
            Duration::from_millis(100),
            Duration::from_millis(120),
            &DecayGrowth::proportional(0.3),
        )
        .unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_zero_growth_is_rejected() {
        let result = decay_intervals(
            Duration::from_millis(100),
            Duration::from_millis(1000),
            &DecayGrowth::proportional(0.001),
        );
        match result {
            Err(LooperError::NonPositiveGrowth { interval }) => {
                assert_eq!(interval, Duration::from_millis(100));
            }
            other => panic!("Expected NonPositiveGrowth, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_growth_ends_sequence() {
        let intervals = decay_intervals(
            Duration::from_millis(100),
            Duration::MAX,
            &DecayGrowth::constant(Duration::MAX),
        )
        .unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_pad_steps_scenario() {
        // request at index 1, 8 decay steps over 5 slots, stop at 3
        assert_eq!(pad_steps(5, 8, 1, 3), 4);
        // projected lands before the stop index
        assert_eq!(pad_steps(5, 8, 2, 3), 3);
        assert_eq!(pad_steps(5, 8, 0, 3), 0);
    }

    #[test]
    fn test_pad_steps_always_lands_on_stop() {
        for size in 1..=12 {
            for decay_count in 0..=25 {
                for current in 0..size {
                    for stop in 0..size {
                        let pad = pad_steps(size, decay_count, current, stop);
                        assert!(pad < size, "pad {} out of range for size {}", pad, size);
                        assert_eq!((current + pad + decay_count) % size, stop);
                    }
                }
            }
        }
    }

    #[test]
    fn test_plan_delays_pad_then_decay() {
        let plan = DecayPlan::new(5, 1, 3, ms(&[130, 169, 219, 284, 369, 479, 622, 808]));
        assert_eq!(plan.pad_steps, 4);
        assert_eq!(plan.total_steps(), 12);
        assert!(!plan.is_snap());

        let delays: Vec<Duration> = plan.delays(Duration::from_millis(100)).collect();
        assert_eq!(&delays[..4], &ms(&[100, 100, 100, 100])[..]);
        assert_eq!(delays[4], Duration::from_millis(130));
        assert_eq!(plan.total_duration(Duration::from_millis(100)), Duration::from_millis(3480));
    }

    #[test]
    fn test_plan_snaps_without_intervals() {
        let plan = DecayPlan::new(5, 1, 3, Vec::new());
        assert!(plan.is_snap());
        assert_eq!(plan.pad_steps, 0);
        assert_eq!(plan.total_steps(), 0);
        assert_eq!(plan.total_duration(Duration::from_millis(100)), Duration::ZERO);
    }
}
