//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - spin: run a looper session and print every update
//! - schedule: print the decay plan for a landing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Decay Looper - spin a cyclic index and land it on a target
#[derive(Parser, Debug)]
#[command(name = "decay-looper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Spin the looper, then decelerate onto the stop index
    Spin(SpinArgs),

    /// Print the decay plan without running it
    Schedule {
        /// Number of slots
        #[arg(short, long)]
        size: Option<usize>,

        /// Index at the moment decay is requested
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        current: i64,

        /// Index to land on
        #[arg(long, allow_hyphen_values = true)]
        stop: Option<i64>,
    },
}

/// Overrides for a spin run; unset values come from the config file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SpinArgs {
    /// Number of slots
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Index to start from
    #[arg(short, long, allow_hyphen_values = true)]
    pub initial: Option<i64>,

    /// Index to land on
    #[arg(long, allow_hyphen_values = true)]
    pub stop: Option<i64>,

    /// How long to spin before decelerating, in milliseconds
    #[arg(long)]
    pub spin_ms: Option<u64>,

    /// Print each update as a JSON line
    #[arg(long)]
    pub json: bool,
}
