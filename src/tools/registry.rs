//! Function registry
//!
//! The execution checker never reaches for a global table: it is handed a
//! `FunctionRegistry` and resolves each call name through it.
//!
//! Functions:
//! - lock_screen: Lock the screen
//! - get_battery_status: Battery level and charging state
//! - search_google: Open a Google search
//! - set_volume: Set output volume
//! - create_note: Create a note

use crate::dataset::types::Arguments;
use crate::tools::implementations::{self, ToolContext};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Declared keyword parameter of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub required: bool,
}

impl Parameter {
    pub const fn required(name: &'static str) -> Self {
        Self { name, required: true }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self { name, required: false }
    }
}

/// A callable the execution checker can invoke
///
/// Returning `Err` marks the call as failed. Any `Ok` value, including
/// `false`, `""` or `null`, is a success.
#[async_trait]
pub trait ToolFunction: Send + Sync {
    /// Keyword parameters accepted by `call`
    fn parameters(&self) -> &[Parameter];

    /// Invoke with already-bound keyword arguments
    async fn call(&self, args: Arguments) -> anyhow::Result<Value>;
}

/// Name -> callable resolution
pub trait FunctionRegistry: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn ToolFunction>>;

    /// Registered names, sorted
    fn names(&self) -> Vec<String>;
}

/// Adapter turning a synchronous closure into a `ToolFunction`
///
/// The closure runs on the blocking thread pool.
pub struct FnTool<F> {
    parameters: Vec<Parameter>,
    func: Arc<F>,
}

impl<F> FnTool<F>
where
    F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    pub fn new(parameters: Vec<Parameter>, func: F) -> Self {
        Self {
            parameters,
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl<F> ToolFunction for FnTool<F>
where
    F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let func = Arc::clone(&self.func);
        match tokio::task::spawn_blocking(move || (*func)(&args)).await {
            Ok(result) => result,
            // Re-raise so the executor records the original payload
            Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
            Err(join_err) => Err(anyhow::anyhow!("blocking call was cancelled: {}", join_err)),
        }
    }
}

/// HashMap-backed registry
#[derive(Clone, Default)]
pub struct ToolRegistry {
    /// Map of function name to callable
    functions: HashMap<String, Arc<dyn ToolFunction>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the five system tools
    pub fn with_system_tools(context: ToolContext) -> Self {
        let mut registry = Self::new();
        implementations::register_system_tools(&mut registry, Arc::new(context));
        registry
    }

    /// Register a callable under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, function: Arc<dyn ToolFunction>) {
        self.functions.insert(name.into(), function);
    }

    /// Register a synchronous closure
    pub fn register_fn<F>(&mut self, name: impl Into<String>, parameters: Vec<Parameter>, func: F)
    where
        F: Fn(&Arguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnTool::new(parameters, func)));
    }

    /// Check if a function exists
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Get total number of functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FunctionRegistry for ToolRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn ToolFunction>> {
        self.functions.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Check keyword arguments against declared parameters
///
/// Unexpected keywords are reported before missing ones.
pub fn bind_arguments(
    function: &str,
    parameters: &[Parameter],
    args: &Arguments,
) -> std::result::Result<(), String> {
    if let Some(unexpected) = args
        .keys()
        .find(|key| !parameters.iter().any(|p| p.name == key.as_str()))
    {
        return Err(format!(
            "{}() got an unexpected keyword argument '{}'",
            function, unexpected
        ));
    }

    let missing: Vec<String> = parameters
        .iter()
        .filter(|p| p.required && !args.contains_key(p.name))
        .map(|p| format!("'{}'", p.name))
        .collect();

    if !missing.is_empty() {
        let noun = if missing.len() == 1 { "argument" } else { "arguments" };
        return Err(format!(
            "{}() missing {} required {}: {}",
            function,
            missing.len(),
            noun,
            missing.join(", ")
        ));
    }

    Ok(())
}

/// Fetch a string argument
pub fn arg_str<'a>(args: &'a Arguments, name: &str) -> anyhow::Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("argument '{}' must be a string", name))
}

/// Fetch an integer argument; integral floats are accepted
pub fn arg_i64(args: &Arguments, name: &str) -> anyhow::Result<i64> {
    let value = args
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("argument '{}' is missing", name))?;

    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| anyhow::anyhow!("argument '{}' must be an integer, got {}", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_registry_creation() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve("anything").is_none());
    }

    #[test]
    fn test_system_tools_registered() {
        let registry = ToolRegistry::with_system_tools(ToolContext::default());
        assert_eq!(registry.len(), 5);
        assert_eq!(
            registry.names(),
            vec![
                "create_note",
                "get_battery_status",
                "lock_screen",
                "search_google",
                "set_volume"
            ]
        );
    }

    #[tokio::test]
    async fn test_register_fn_and_resolve() {
        let mut registry = ToolRegistry::new();
        registry.register_fn(
            "add",
            vec![Parameter::required("a"), Parameter::required("b")],
            |args| Ok(json!(arg_i64(args, "a")? + arg_i64(args, "b")?)),
        );

        let add = registry.resolve("add").unwrap();
        assert_eq!(add.parameters().len(), 2);
        let value = add.call(args(json!({"a": 2, "b": 3}))).await.unwrap();
        assert_eq!(value, json!(5));
    }

    #[test]
    fn test_bind_accepts_exact_arguments() {
        let params = [Parameter::required("title"), Parameter::optional("content")];
        assert!(bind_arguments("create_note", &params, &args(json!({"title": "t"}))).is_ok());
    }

    #[test]
    fn test_bind_rejects_unexpected_keyword() {
        let err = bind_arguments("lock_screen", &[], &args(json!({"force": true}))).unwrap_err();
        assert_eq!(err, "lock_screen() got an unexpected keyword argument 'force'");
    }

    #[test]
    fn test_bind_reports_missing_arguments() {
        let params = [Parameter::required("title"), Parameter::required("content")];
        let err = bind_arguments("create_note", &params, &Arguments::new()).unwrap_err();
        assert_eq!(err, "create_note() missing 2 required arguments: 'title', 'content'");
    }

    #[test]
    fn test_arg_helpers() {
        let a = args(json!({"q": "bread", "n": 30, "f": 50.0, "bad": "x"}));
        assert_eq!(arg_str(&a, "q").unwrap(), "bread");
        assert_eq!(arg_i64(&a, "n").unwrap(), 30);
        assert_eq!(arg_i64(&a, "f").unwrap(), 50);
        assert!(arg_i64(&a, "bad").is_err());
        assert!(arg_str(&a, "n").is_err());
    }
}
