//! Looper module - the stepping state machine and its control routine.
//!
//! This module provides:
//! - DecayIndexLooper, the public component with its two commands
//! - LooperConfig for construction parameters
//! - the per-session control routine and output plumbing

mod config;
mod index_looper;
mod output;
mod session;

pub use config::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_LINEAR_INTERVAL, DEFAULT_MAX_DECAY_MULTIPLIER, LooperConfig,
    MAX_HISTORY_CAPACITY,
};
pub use index_looper::DecayIndexLooper;
