//! CLI module for decay-looper - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for running a looper
//! session and inspecting decay plans.

pub mod commands;

pub use commands::Cli;
