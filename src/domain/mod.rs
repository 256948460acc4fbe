//! Domain types shared by the looper and its harnesses.

pub mod state;

pub use state::{LooperState, Phase, clamp_index};
