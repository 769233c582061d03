//! callforge - function-calling dataset synthesizer
//!
//! Generates single-tool, multi-tool and unknown-intent examples for a
//! small set of desktop tools, paraphrases and validates them, and gates
//! publishing on a parallel execution check that runs every expected call
//! against a live function registry.
//!
//! # Architecture
//!
//! - **tools**: function registry, system tools, execution checker
//! - **dataset**: record types, generation, format check, dedup, storage
//! - **llm / embedding / hub**: external collaborators behind traits
//! - **pipeline**: end-to-end build orchestration

pub mod errors;
pub mod dataset;
pub mod tools;

// Re-export commonly used types
pub use errors::{DatasetError, Result};

// Collaborators
pub mod llm;
pub mod embedding;
pub mod hub;

pub mod pipeline;

// Application shell
pub mod cli;
pub mod config;
pub mod logging;
