//! System tool implementations
//!
//! The five functions the generated dataset refers to, wrapped as
//! `ToolFunction`s over a shared `ToolContext`.

pub mod notes;
pub mod process;
pub mod system;

pub use notes::create_note;
pub use process::{CommandRunner, Platform, SystemCommandRunner};
pub use system::{get_battery_status, lock_screen, search_google, set_volume};

use crate::dataset::types::Arguments;
use crate::tools::registry::{arg_i64, arg_str, Parameter, ToolFunction, ToolRegistry};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Environment shared by the system tools
#[derive(Clone)]
pub struct ToolContext {
    /// Process launcher
    pub runner: Arc<dyn CommandRunner>,

    /// Host platform, selects per-OS commands
    pub platform: Platform,

    /// Notes are written under `<home>/Documents/Notes`
    pub home_dir: PathBuf,

    /// sysfs power supply class directory (Linux battery readout)
    pub power_supply_dir: PathBuf,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            runner: Arc::new(SystemCommandRunner::default()),
            platform: Platform::current(),
            home_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            power_supply_dir: PathBuf::from("/sys/class/power_supply"),
        }
    }
}

impl ToolContext {
    /// Set command runner
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Set platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set home directory
    pub fn with_home_dir(mut self, home_dir: impl Into<PathBuf>) -> Self {
        self.home_dir = home_dir.into();
        self
    }

    /// Set power supply directory
    pub fn with_power_supply_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.power_supply_dir = dir.into();
        self
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("platform", &self.platform)
            .field("home_dir", &self.home_dir)
            .field("power_supply_dir", &self.power_supply_dir)
            .finish_non_exhaustive()
    }
}

/// Register lock_screen, get_battery_status, search_google, set_volume, create_note
pub fn register_system_tools(registry: &mut ToolRegistry, ctx: Arc<ToolContext>) {
    registry.register("lock_screen", Arc::new(LockScreen(ctx.clone())));
    registry.register("get_battery_status", Arc::new(BatteryStatus(ctx.clone())));
    registry.register("search_google", Arc::new(SearchGoogle(ctx.clone())));
    registry.register("set_volume", Arc::new(SetVolume(ctx.clone())));
    registry.register("create_note", Arc::new(CreateNote(ctx)));
}

struct LockScreen(Arc<ToolContext>);
struct BatteryStatus(Arc<ToolContext>);
struct SearchGoogle(Arc<ToolContext>);
struct SetVolume(Arc<ToolContext>);
struct CreateNote(Arc<ToolContext>);

#[async_trait]
impl ToolFunction for LockScreen {
    fn parameters(&self) -> &[Parameter] {
        &[]
    }

    async fn call(&self, _args: Arguments) -> anyhow::Result<Value> {
        Ok(Value::String(lock_screen(&self.0).await))
    }
}

#[async_trait]
impl ToolFunction for BatteryStatus {
    fn parameters(&self) -> &[Parameter] {
        &[]
    }

    async fn call(&self, _args: Arguments) -> anyhow::Result<Value> {
        Ok(get_battery_status(&self.0).await)
    }
}

#[async_trait]
impl ToolFunction for SearchGoogle {
    fn parameters(&self) -> &[Parameter] {
        const PARAMS: &[Parameter] = &[Parameter::required("query")];
        PARAMS
    }

    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let query = arg_str(&args, "query")?;
        Ok(Value::String(search_google(&self.0, query).await))
    }
}

#[async_trait]
impl ToolFunction for SetVolume {
    fn parameters(&self) -> &[Parameter] {
        const PARAMS: &[Parameter] = &[Parameter::required("level")];
        PARAMS
    }

    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let level = arg_i64(&args, "level")?;
        Ok(Value::String(set_volume(&self.0, level).await))
    }
}

#[async_trait]
impl ToolFunction for CreateNote {
    fn parameters(&self) -> &[Parameter] {
        const PARAMS: &[Parameter] = &[Parameter::required("title"), Parameter::required("content")];
        PARAMS
    }

    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        let title = arg_str(&args, "title")?;
        let content = arg_str(&args, "content")?;
        Ok(Value::String(create_note(&self.0, title, content).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::implementations::process::testing::RecordingRunner;
    use crate::tools::registry::FunctionRegistry;
    use serde_json::json;

    fn registry(runner: Arc<RecordingRunner>) -> ToolRegistry {
        ToolRegistry::with_system_tools(
            ToolContext::default()
                .with_platform(Platform::MacOs)
                .with_runner(runner),
        )
    }

    #[tokio::test]
    async fn test_set_volume_through_registry() {
        let runner = Arc::new(RecordingRunner::default());
        let registry = registry(runner.clone());

        let tool = registry.resolve("set_volume").unwrap();
        let output = tool
            .call(json!({"level": 70}).as_object().cloned().unwrap())
            .await
            .unwrap();
        assert_eq!(output, json!("Volume set to 70%"));
    }

    #[tokio::test]
    async fn test_wrong_argument_type_raises() {
        let registry = registry(Arc::new(RecordingRunner::default()));
        let tool = registry.resolve("set_volume").unwrap();

        let err = tool
            .call(json!({"level": "loud"}).as_object().cloned().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[test]
    fn test_declared_parameters() {
        let registry = registry(Arc::new(RecordingRunner::default()));
        let names: Vec<&str> = registry
            .resolve("create_note")
            .unwrap()
            .parameters()
            .iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["title", "content"]);
        assert!(registry.resolve("lock_screen").unwrap().parameters().is_empty());
    }
}
