//! Decay growth strategies
//!
//! A growth rule maps the current delay to the amount it grows by on the
//! next decay step. Rules are plain closures behind an `Arc` so configs stay
//! cheap to clone and can be shared with the control routine.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default factor for [`DecayGrowth::proportional`]
pub const DEFAULT_DECAY_FACTOR: f64 = 0.3;

type GrowthFn = dyn Fn(Duration) -> Duration + Send + Sync;

/// Rule deciding how much the delay grows at each decay step
#[derive(Clone)]
pub struct DecayGrowth {
    rule: Arc<GrowthFn>,
    label: String,
}

impl DecayGrowth {
    /// Wrap an arbitrary growth closure.
    ///
    /// The closure must return a strictly positive increment for every delay
    /// it is given, otherwise sequence generation fails.
    pub fn new<F>(rule: F) -> Self
    where
        F: Fn(Duration) -> Duration + Send + Sync + 'static,
    {
        Self {
            rule: Arc::new(rule),
            label: "custom".to_string(),
        }
    }

    /// Grow by `factor` times the current delay, truncated to whole milliseconds.
    pub fn proportional(factor: f64) -> Self {
        Self {
            rule: Arc::new(move |interval: Duration| {
                // float-to-int casts saturate, so NaN and negatives land on zero
                let millis = interval.as_millis() as f64 * factor;
                Duration::from_millis(millis as u64)
            }),
            label: format!("proportional({})", factor),
        }
    }

    /// Grow by the same step every time.
    pub fn constant(step: Duration) -> Self {
        Self {
            rule: Arc::new(move |_| step),
            label: format!("constant({:?})", step),
        }
    }

    /// Increment to add to `interval`.
    pub fn increment(&self, interval: Duration) -> Duration {
        (self.rule)(interval)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for DecayGrowth {
    fn default() -> Self {
        Self::proportional(DEFAULT_DECAY_FACTOR)
    }
}

impl fmt::Debug for DecayGrowth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DecayGrowth").field(&self.label).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proportional_truncates_to_millis() {
        let growth = DecayGrowth::proportional(0.3);
        assert_eq!(growth.increment(Duration::from_millis(100)), Duration::from_millis(30));
        assert_eq!(growth.increment(Duration::from_millis(169)), Duration::from_millis(50));
        assert_eq!(growth.increment(Duration::from_millis(622)), Duration::from_millis(186));
    }

    #[test]
    fn test_proportional_negative_factor_is_zero() {
        let growth = DecayGrowth::proportional(-1.0);
        assert_eq!(growth.increment(Duration::from_millis(100)), Duration::ZERO);
    }

    #[test]
    fn test_constant_ignores_interval() {
        let growth = DecayGrowth::constant(Duration::from_millis(25));
        assert_eq!(growth.increment(Duration::from_millis(1)), Duration::from_millis(25));
        assert_eq!(growth.increment(Duration::from_secs(9)), Duration::from_millis(25));
    }

    #[test]
    fn test_custom_rule() {
        let growth = DecayGrowth::new(|interval| interval / 2);
        assert_eq!(growth.increment(Duration::from_millis(80)), Duration::from_millis(40));
        assert_eq!(growth.label(), "custom");
    }

    #[test]
    fn test_default_is_proportional_point_three() {
        let growth = DecayGrowth::default();
        assert_eq!(growth.label(), "proportional(0.3)");
        assert_eq!(format!("{:?}", growth), r#"DecayGrowth("proportional(0.3)")"#);
    }
}
