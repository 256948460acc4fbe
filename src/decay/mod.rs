//! Deceleration math.
//!
//! - `growth`: pluggable rules for how much each decay delay grows
//! - `schedule`: delay sequence generation and landing alignment

pub mod growth;
pub mod schedule;

pub use growth::{DEFAULT_DECAY_FACTOR, DecayGrowth};
pub use schedule::{DecayPlan, decay_intervals, pad_steps};
