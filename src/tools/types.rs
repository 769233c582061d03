//! Execution check types
//!
//! Outcomes, per-example groupings and the aggregate report produced by
//! the execution checker.

use crate::dataset::store::save_json;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Status of a single call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Callable returned normally
    Success,
    /// Callable was invoked and raised
    Fail,
    /// Function not found in the registry, never invoked
    Error,
}

/// Why an invoked call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Callable returned an error
    Raised,
    /// Callable panicked
    Panicked,
    /// Per-call timeout expired
    Timeout,
    /// Keyword arguments did not bind to the callable's parameters
    InvalidArguments,
}

/// Outcome of one call, tagged by status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    Success {
        function: String,
        output: Value,
    },
    Fail {
        function: String,
        kind: FailureKind,
        error: String,
        traceback: String,
    },
    Error {
        function: String,
        message: String,
    },
}

impl CallOutcome {
    /// Successful return with opaque payload
    pub fn success(function: impl Into<String>, output: Value) -> Self {
        CallOutcome::Success {
            function: function.into(),
            output,
        }
    }

    /// Invoked call that failed
    pub fn failure(
        function: impl Into<String>,
        kind: FailureKind,
        error: impl Into<String>,
        traceback: impl Into<String>,
    ) -> Self {
        CallOutcome::Fail {
            function: function.into(),
            kind,
            error: error.into(),
            traceback: traceback.into(),
        }
    }

    /// Registry miss
    pub fn not_found(function: impl Into<String>) -> Self {
        let function = function.into();
        let message = format!("Function '{}' not found", function);
        CallOutcome::Error { function, message }
    }

    pub fn status(&self) -> OutcomeStatus {
        match self {
            CallOutcome::Success { .. } => OutcomeStatus::Success,
            CallOutcome::Fail { .. } => OutcomeStatus::Fail,
            CallOutcome::Error { .. } => OutcomeStatus::Error,
        }
    }

    pub fn function(&self) -> &str {
        match self {
            CallOutcome::Success { function, .. }
            | CallOutcome::Fail { function, .. }
            | CallOutcome::Error { function, .. } => function,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == OutcomeStatus::Success
    }
}

/// Outcomes grouped under their originating example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleReport {
    pub id: u64,
    pub query: String,
    pub results: Vec<CallOutcome>,
}

/// Aggregate result of one execution check run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub total_function_calls: usize,
    pub passed: usize,
    pub failed: usize,

    /// Percentage in `[0, 100]`, rounded to two decimals
    pub success_rate: f64,

    /// One entry per example, in input order
    pub detailed: Vec<ExampleReport>,
}

impl ExecutionReport {
    /// Build a report from final counters
    pub fn new(tally: CallTally, detailed: Vec<ExampleReport>) -> Self {
        Self {
            total_function_calls: tally.total,
            passed: tally.passed,
            failed: tally.failed,
            success_rate: tally.success_rate(),
            detailed,
        }
    }

    /// Write the report as indented JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(path, self)
    }

    /// Human-facing summary lines
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Executed {} calls", self.total_function_calls),
            format!("Passed: {}", self.passed),
            format!("Failed: {}", self.failed),
            format!("Success Rate: {:.2}%", self.success_rate),
        ]
    }

    /// Entry for an example id
    pub fn example(&self, id: u64) -> Option<&ExampleReport> {
        self.detailed.iter().find(|entry| entry.id == id)
    }
}

/// Running pass/fail counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallTally {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl CallTally {
    /// Count one outcome
    pub fn record(&mut self, outcome: &CallOutcome) {
        self.total += 1;
        if outcome.is_success() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    /// `round(passed / total * 100, 2)`, or 0 when nothing ran
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            let rate = self.passed as f64 / self.total as f64 * 100.0;
            (rate * 100.0).round() / 100.0
        }
    }
}
