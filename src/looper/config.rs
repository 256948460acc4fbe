//! Looper construction parameters.

use std::time::Duration;

use crate::decay::{DecayGrowth, decay_intervals};
use crate::error::{LooperError, Result};

/// Default delay between linear steps
pub const DEFAULT_LINEAR_INTERVAL: Duration = Duration::from_millis(100);

/// Default multiple of the linear interval used as the decay bound
pub const DEFAULT_MAX_DECAY_MULTIPLIER: u32 = 10;

/// Default number of buffered updates per `updates()` receiver
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Largest accepted history capacity; the broadcast ring is allocated up front
pub const MAX_HISTORY_CAPACITY: usize = 1 << 20;

/// Configuration for a `DecayIndexLooper`.
#[derive(Debug, Clone)]
pub struct LooperConfig {
    /// Delay between steps while linear
    pub linear_interval: Duration,
    /// Decay ends once the grown delay would pass this
    pub max_decay_interval: Duration,
    /// How much each decay delay grows over the previous one
    pub decay_growth: DecayGrowth,
    /// Buffered updates per `updates()` receiver before it lags
    pub history_capacity: usize,
}

impl Default for LooperConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LINEAR_INTERVAL)
    }
}

impl LooperConfig {
    /// Config with the given linear interval and a decay bound of ten times it.
    pub fn new(linear_interval: Duration) -> Self {
        Self {
            linear_interval,
            max_decay_interval: linear_interval.saturating_mul(DEFAULT_MAX_DECAY_MULTIPLIER),
            decay_growth: DecayGrowth::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    pub fn with_max_decay_interval(mut self, max_decay_interval: Duration) -> Self {
        self.max_decay_interval = max_decay_interval;
        self
    }

    pub fn with_decay_growth(mut self, decay_growth: DecayGrowth) -> Self {
        self.decay_growth = decay_growth;
        self
    }

    pub fn with_history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = history_capacity;
        self
    }

    /// Delay sequence for this config.
    pub fn decay_intervals(&self) -> Result<Vec<Duration>> {
        decay_intervals(self.linear_interval, self.max_decay_interval, &self.decay_growth)
    }

    /// Check the config before any session runs.
    ///
    /// Runs the growth rule once over the whole sequence so a rule that
    /// would never terminate fails here rather than mid-session.
    pub fn validate(&self) -> Result<()> {
        if self.linear_interval.is_zero() {
            return Err(LooperError::InvalidConfig(
                "linear interval must be positive".into(),
            ));
        }
        if self.max_decay_interval <= self.linear_interval {
            return Err(LooperError::InvalidConfig(format!(
                "max decay interval {:?} must exceed linear interval {:?}",
                self.max_decay_interval, self.linear_interval
            )));
        }
        if self.history_capacity == 0 {
            return Err(LooperError::InvalidConfig(
                "history capacity must be positive".into(),
            ));
        }
        if self.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(LooperError::InvalidConfig(format!(
                "history capacity {} exceeds {}",
                self.history_capacity, MAX_HISTORY_CAPACITY
            )));
        }

        self.decay_intervals()?;
        Ok(())
    }
}
