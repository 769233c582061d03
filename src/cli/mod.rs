//! CLI module for callforge
//!
//! Handles command-line argument parsing.

pub mod args;

pub use args::{Args, BuildArgs, CheckArgs, Commands, Verbosity};
