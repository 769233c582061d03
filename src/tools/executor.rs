//! Parallel execution checker
//!
//! Runs every call referenced by a batch of examples against a function
//! registry and reports per-example outcomes:
//! - Bounded concurrency (semaphore-limited active calls, unbounded queue)
//! - Each call isolated in its own task; errors and panics become outcomes
//! - Single-consumer aggregation, no shared mutable report state
//! - Optional per-call timeout

use crate::dataset::types::{Arguments, Example};
use crate::errors::{DatasetError, Result};
use crate::tools::registry::{bind_arguments, FunctionRegistry, ToolFunction};
use crate::tools::types::{CallOutcome, CallTally, ExampleReport, ExecutionReport, FailureKind};
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Default number of calls executing at once
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 8;

/// One resolved call, ready to dispatch
struct ExecutionTask {
    /// Index of the owning entry in `detailed`
    slot: usize,
    example_id: u64,
    function: String,
    callable: Arc<dyn ToolFunction>,
    arguments: Arguments,
}

/// Execution checker over an injected registry
pub struct ExecutionChecker {
    /// Function registry
    registry: Arc<dyn FunctionRegistry>,

    /// Semaphore for concurrency control
    semaphore: Arc<Semaphore>,

    concurrency_limit: usize,

    /// Optional per-call deadline
    call_timeout: Option<Duration>,
}

impl ExecutionChecker {
    /// Create a checker allowing at most `concurrency_limit` concurrent calls
    pub fn new(registry: Arc<dyn FunctionRegistry>, concurrency_limit: usize) -> Result<Self> {
        if concurrency_limit == 0 {
            return Err(DatasetError::Config(
                "concurrency limit must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            registry,
            semaphore: Arc::new(Semaphore::new(concurrency_limit)),
            concurrency_limit,
            call_timeout: None,
        })
    }

    /// Convert calls running longer than `timeout` into `fail` outcomes
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Get current parallelism limit
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Get registry reference
    pub fn registry(&self) -> &Arc<dyn FunctionRegistry> {
        &self.registry
    }

    /// Stop the worker pool. Later runs fail with an infrastructure error.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Execute every call in `examples` and build the report
    ///
    /// Only a worker-pool failure returns `Err`; every per-call failure is
    /// recorded in the report.
    pub async fn run(&self, examples: &[Example]) -> Result<ExecutionReport> {
        let (mut detailed, tasks, mut tally) = self.flatten(examples);
        info!(
            examples = examples.len(),
            dispatched = tasks.len(),
            missing = tally.failed,
            concurrency_limit = self.concurrency_limit,
            "Starting execution check"
        );

        let mut completed: Vec<Vec<CallOutcome>> = vec![Vec::new(); detailed.len()];
        let mut join_set = JoinSet::new();

        for task in tasks {
            let semaphore = Arc::clone(&self.semaphore);
            let call_timeout = self.call_timeout;
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|_| {
                    DatasetError::Infrastructure("worker pool is closed".to_string())
                })?;
                let slot = task.slot;
                let outcome = execute_task(task, call_timeout).await;
                Ok::<_, DatasetError>((slot, outcome))
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let (slot, outcome) = match joined {
                Ok(Ok(done)) => done,
                Ok(Err(err)) => {
                    join_set.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    join_set.abort_all();
                    return Err(DatasetError::Infrastructure(format!(
                        "execution worker failed: {}",
                        join_err
                    )));
                }
            };

            tally.record(&outcome);
            completed[slot].push(outcome);
        }

        for (entry, outcomes) in detailed.iter_mut().zip(completed) {
            entry.results.extend(outcomes);
        }

        let report = ExecutionReport::new(tally, detailed);
        info!(
            total = report.total_function_calls,
            passed = report.passed,
            failed = report.failed,
            success_rate = report.success_rate,
            "Execution check finished"
        );
        Ok(report)
    }

    /// Resolve every call, recording registry misses immediately
    fn flatten(&self, examples: &[Example]) -> (Vec<ExampleReport>, Vec<ExecutionTask>, CallTally) {
        let mut detailed: Vec<ExampleReport> = Vec::with_capacity(examples.len());
        let mut slots: HashMap<u64, usize> = HashMap::new();
        let mut tasks = Vec::new();
        let mut tally = CallTally::default();

        for example in examples {
            let slot = match slots.get(&example.id) {
                Some(&slot) => {
                    warn!(id = example.id, "Duplicate example id; merging outcomes");
                    detailed[slot].query = example.query.clone();
                    slot
                }
                None => {
                    detailed.push(ExampleReport {
                        id: example.id,
                        query: example.query.clone(),
                        results: Vec::new(),
                    });
                    slots.insert(example.id, detailed.len() - 1);
                    detailed.len() - 1
                }
            };

            for call in &example.answers {
                match self.registry.resolve(&call.name) {
                    Some(callable) => tasks.push(ExecutionTask {
                        slot,
                        example_id: example.id,
                        function: call.name.clone(),
                        callable,
                        arguments: call.arguments.clone(),
                    }),
                    None => {
                        debug!(id = example.id, function = %call.name, "Function not registered");
                        let outcome = CallOutcome::not_found(&call.name);
                        tally.record(&outcome);
                        detailed[slot].results.push(outcome);
                    }
                }
            }
        }

        (detailed, tasks, tally)
    }
}

/// Run a whole batch with a fresh checker
pub async fn run_execution_checker(
    examples: &[Example],
    registry: Arc<dyn FunctionRegistry>,
    concurrency_limit: usize,
) -> Result<ExecutionReport> {
    ExecutionChecker::new(registry, concurrency_limit)?
        .run(examples)
        .await
}

/// Invoke one call inside its own task so a panic stays contained
async fn execute_task(task: ExecutionTask, call_timeout: Option<Duration>) -> CallOutcome {
    let ExecutionTask {
        example_id,
        function,
        callable,
        arguments,
        ..
    } = task;

    let call_site = format!(
        "at {}({}) for example {}",
        function,
        serde_json::to_string(&arguments).unwrap_or_default(),
        example_id
    );

    if let Err(message) = bind_arguments(&function, callable.parameters(), &arguments) {
        let traceback = boundary_traceback(&format!("ArgumentError: {}", message), &call_site);
        return CallOutcome::failure(&function, FailureKind::InvalidArguments, message, traceback);
    }

    let mut handle = tokio::spawn(async move { callable.call(arguments).await });

    let joined = match call_timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                debug!(id = example_id, function = %function, "Call timed out");
                let message = format!("Function '{}' timed out after {}ms", function, limit.as_millis());
                let traceback = boundary_traceback(&format!("Timeout: {}", message), &call_site);
                return CallOutcome::failure(&function, FailureKind::Timeout, message, traceback);
            }
        },
        None => handle.await,
    };

    let outcome = match joined {
        Ok(Ok(output)) => CallOutcome::success(&function, output),
        Ok(Err(err)) => CallOutcome::failure(
            &function,
            FailureKind::Raised,
            format!("{:#}", err),
            render_traceback(&err, &call_site),
        ),
        Err(join_err) if join_err.is_panic() => {
            let message = panic_message(join_err.into_panic());
            let traceback = boundary_traceback(&format!("Panic: {}", message), &call_site);
            CallOutcome::failure(&function, FailureKind::Panicked, message, traceback)
        }
        Err(join_err) => {
            let message = format!("call was cancelled: {}", join_err);
            let traceback = boundary_traceback(&format!("Cancelled: {}", join_err), &call_site);
            CallOutcome::failure(&function, FailureKind::Raised, message, traceback)
        }
    };

    debug!(id = example_id, function = %function, status = ?outcome.status(), "Call completed");
    outcome
}

/// Error chain, call site and the error's captured backtrace, if any
fn render_traceback(err: &anyhow::Error, call_site: &str) -> String {
    let mut lines: Vec<String> = err
        .chain()
        .enumerate()
        .map(|(depth, cause)| {
            if depth == 0 {
                format!("Error: {}", cause)
            } else {
                format!("Caused by: {}", cause)
            }
        })
        .collect();
    lines.push(format!("  {}", call_site));

    let backtrace = err.backtrace();
    if backtrace.status() == BacktraceStatus::Captured {
        lines.push(backtrace.to_string());
    }

    lines.join("\n")
}

/// Headline, call site and a backtrace of the task boundary when enabled
fn boundary_traceback(headline: &str, call_site: &str) -> String {
    let mut traceback = format!("{}\n  {}", headline, call_site);
    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        traceback.push('\n');
        traceback.push_str(&backtrace.to_string());
    }
    traceback
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
