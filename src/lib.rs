//! Decay Looper - a cyclic index that spins, slows down, and stops on target
//!
//! A `DecayIndexLooper` steps an index around `[0, size)` at a constant
//! cadence until a stop index is requested, then decelerates with growing
//! delays and comes to rest exactly on that index. Harnesses drive it with
//! two commands and watch its `(phase, index)` output.

pub mod decay;
pub mod domain;
pub mod error;
pub mod looper;

pub use decay::{DecayGrowth, DecayPlan};
pub use domain::{LooperState, Phase};
pub use error::{LooperError, Result};
pub use looper::{DecayIndexLooper, LooperConfig};
