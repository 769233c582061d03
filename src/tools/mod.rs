//! Function registry and execution checking
//!
//! Provides parallel, isolated execution of dataset calls with:
//! - Injected function registry (name -> callable)
//! - Five system tools behind a swappable command runner
//! - Semaphore-bounded executor with per-call failure capture

pub mod types;
pub mod registry;
pub mod executor;
pub mod implementations;

// Re-export commonly used types
pub use types::{CallOutcome, CallTally, ExampleReport, ExecutionReport, FailureKind, OutcomeStatus};
pub use registry::{FunctionRegistry, Parameter, ToolFunction, ToolRegistry};
pub use executor::{run_execution_checker, ExecutionChecker, DEFAULT_CONCURRENCY_LIMIT};
pub use implementations::ToolContext;
