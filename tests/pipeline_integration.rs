//! Pipeline tests with in-memory collaborators
//!
//! No network, no real system tools: the LLM, hub, few-shot source and
//! function registry are all fakes.

use async_trait::async_trait;
use callforge::dataset::{load_examples, tool_catalog, Example};
use callforge::errors::{DatasetError, Result};
use callforge::hub::{DatasetHub, FewShotSource};
use callforge::llm::{ChatMessage, CompletionClient};
use callforge::pipeline::{BuildOptions, DatasetPipeline};
use callforge::tools::{FunctionRegistry, Parameter, ToolRegistry};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Answers format checks, paraphrases and multi-tool prompts
struct FakeLlm {
    reject_negatives: bool,
}

#[async_trait]
impl CompletionClient for FakeLlm {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        if messages[0].role == "system" {
            let entry = &messages[1].content;
            if self.reject_negatives && entry.contains("\"answers\": []") {
                return Ok("INVALID ❌: answers must not be empty".to_string());
            }
            return Ok("VALID ✅".to_string());
        }

        let prompt = &messages[0].content;
        if let Some(rest) = prompt.split("Input: ").nth(1) {
            let query = rest.split('\n').next().unwrap_or_default();
            return Ok(format!("Could you please {}", query.to_lowercase()));
        }
        Ok("Lock my screen and then search for bread recipes".to_string())
    }
}

#[derive(Default)]
struct FakeHub {
    files: Vec<String>,
    fail_listing: bool,
    pushes: Mutex<Vec<(String, String, usize)>>,
}

#[async_trait]
impl DatasetHub for FakeHub {
    async fn list_files(&self, _repo_id: &str) -> Result<Vec<String>> {
        if self.fail_listing {
            return Err(DatasetError::Hub("HTTP 503".to_string()));
        }
        Ok(self.files.clone())
    }

    async fn push(&self, repo_id: &str, config_name: &str, examples: &[Example]) -> Result<()> {
        self.pushes
            .lock()
            .unwrap()
            .push((repo_id.to_string(), config_name.to_string(), examples.len()));
        Ok(())
    }
}

struct FakeFewShot {
    fail: bool,
}

#[async_trait]
impl FewShotSource for FakeFewShot {
    async fn fetch_examples(&self, _dataset: &str, count: usize) -> Result<Vec<String>> {
        if self.fail {
            return Err(DatasetError::Hub("rows endpoint unavailable".to_string()));
        }
        Ok((0..count)
            .map(|i| json!({"query": format!("demo {}", i)}).to_string())
            .collect())
    }
}

/// Every catalog tool succeeds, except the ones named in `failing`
fn fake_registry(failing: &[&'static str]) -> Arc<dyn FunctionRegistry> {
    let mut registry = ToolRegistry::new();
    for tool in tool_catalog() {
        let params: Vec<Parameter> = tool
            .sample_args
            .iter()
            .map(|(name, _)| Parameter::required(*name))
            .collect();
        let fails = failing.contains(&tool.name);
        registry.register_fn(tool.name, params, move |_| {
            if fails {
                anyhow::bail!("device unavailable")
            }
            Ok(json!("done"))
        });
    }
    Arc::new(registry)
}

fn options(temp: &TempDir) -> BuildOptions {
    BuildOptions {
        single_tool_examples_per_tool: 1,
        multi_tool_examples: 1,
        unknown_intent_examples: 1,
        paraphrase_count: 2,
        data_dir: temp.path().join("data"),
        seed: Some(7),
        ..BuildOptions::default()
    }
}

fn pipeline(hub: Arc<FakeHub>, registry: Arc<dyn FunctionRegistry>) -> DatasetPipeline {
    DatasetPipeline::new(
        Arc::new(FakeLlm { reject_negatives: false }),
        Arc::new(FakeFewShot { fail: false }),
        hub,
        registry,
    )
}

#[tokio::test]
async fn test_full_run_publishes_next_version() {
    let temp = TempDir::new().unwrap();
    let hub = Arc::new(FakeHub {
        files: vec![
            "README.md".to_string(),
            "data/v0/train.json".to_string(),
            "data/v1/train.json".to_string(),
        ],
        ..FakeHub::default()
    });
    let mut opts = options(&temp);
    opts.push_to_hub = true;
    opts.hub_repo_id = Some("me/tools".to_string());
    opts.min_success_rate = 1.0;

    let outcome = pipeline(hub.clone(), fake_registry(&[])).run(&opts).await.unwrap();

    // 5 single-tool + 1 multi-tool + 1 negative + 2 paraphrases
    assert_eq!(outcome.example_count, 9);
    let saved = load_examples(outcome.dataset_path.as_ref().unwrap(), None).unwrap();
    assert_eq!(saved.len(), 9);

    let ids: Vec<u64> = saved.iter().map(|e| e.id).collect();
    assert_eq!(ids, (1..=9).collect::<Vec<u64>>());

    let report = outcome.execution.as_ref().unwrap();
    assert_eq!(report.success_rate, 100.0);
    assert!(outcome.publish_blocked.is_none());

    let published = outcome.published.unwrap();
    assert_eq!(published.repo_id, "me/tools");
    assert_eq!(published.config_name, "v2");
    assert_eq!(hub.pushes.lock().unwrap().as_slice(), &[("me/tools".to_string(), "v2".to_string(), 9)]);
}

#[tokio::test]
async fn test_low_success_rate_blocks_publish_but_saves() {
    let temp = TempDir::new().unwrap();
    let hub = Arc::new(FakeHub::default());
    let mut opts = options(&temp);
    opts.push_to_hub = true;
    opts.hub_repo_id = Some("me/tools".to_string());
    opts.min_success_rate = 0.99;

    let outcome = pipeline(hub.clone(), fake_registry(&["set_volume"]))
        .run(&opts)
        .await
        .unwrap();

    assert!(outcome.dataset_path.is_some());
    assert!(outcome.execution.as_ref().unwrap().failed > 0);
    assert!(outcome.publish_blocked.as_ref().unwrap().contains("below threshold"));
    assert!(outcome.published.is_none());
    assert!(hub.pushes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fail_on_invalid_aborts_before_saving() {
    let temp = TempDir::new().unwrap();
    let mut opts = options(&temp);
    opts.validate_format = true;
    opts.fail_on_invalid = true;
    opts.format_report = Some(temp.path().join("format_report.json"));

    let pipeline = DatasetPipeline::new(
        Arc::new(FakeLlm { reject_negatives: true }),
        Arc::new(FakeFewShot { fail: false }),
        Arc::new(FakeHub::default()),
        fake_registry(&[]),
    );
    let outcome = pipeline.run(&opts).await.unwrap();

    assert!(outcome.aborted);
    assert!(outcome.dataset_path.is_none());
    assert!(!opts.dataset_path().exists());

    let (valid, invalid) = outcome.format_counts.unwrap();
    assert!(invalid >= 1);
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp.path().join("format_report.json")).unwrap())
            .unwrap();
    assert_eq!(report["valid_count"], valid);
    assert_eq!(report["invalid_count"], invalid);
}

#[tokio::test]
async fn test_format_check_keeps_only_valid_entries() {
    let temp = TempDir::new().unwrap();
    let mut opts = options(&temp);
    opts.validate_format = true;
    opts.paraphrase_count = 0;

    let pipeline = DatasetPipeline::new(
        Arc::new(FakeLlm { reject_negatives: true }),
        Arc::new(FakeFewShot { fail: false }),
        Arc::new(FakeHub::default()),
        fake_registry(&[]),
    );
    let outcome = pipeline.run(&opts).await.unwrap();

    let saved = load_examples(outcome.dataset_path.unwrap(), None).unwrap();
    assert_eq!(saved.len(), 6);
    assert!(saved.iter().all(|e| !e.is_negative()));
}

#[tokio::test]
async fn test_missing_repo_id_skips_publish() {
    let temp = TempDir::new().unwrap();
    let hub = Arc::new(FakeHub::default());
    let mut opts = options(&temp);
    opts.push_to_hub = true;

    let outcome = pipeline(hub.clone(), fake_registry(&[])).run(&opts).await.unwrap();
    assert!(outcome.published.is_none());
    assert!(hub.pushes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_default_repo_id_and_listing_failure_fall_back_to_v0() {
    let temp = TempDir::new().unwrap();
    let hub = Arc::new(FakeHub {
        fail_listing: true,
        ..FakeHub::default()
    });
    let mut opts = options(&temp);
    opts.push_to_hub = true;
    opts.skip_execution_checker = true;

    let outcome = pipeline(hub.clone(), fake_registry(&[]))
        .with_default_repo_id(Some("team/calls".to_string()))
        .run(&opts)
        .await
        .unwrap();

    assert!(outcome.execution.is_none());
    let published = outcome.published.unwrap();
    assert_eq!(published.repo_id, "team/calls");
    assert_eq!(published.config_name, "v0");
}

#[tokio::test]
async fn test_few_shot_failure_is_not_fatal() {
    let temp = TempDir::new().unwrap();
    let pipeline = DatasetPipeline::new(
        Arc::new(FakeLlm { reject_negatives: false }),
        Arc::new(FakeFewShot { fail: true }),
        Arc::new(FakeHub::default()),
        fake_registry(&[]),
    );

    let outcome = pipeline.run(&options(&temp)).await.unwrap();
    assert_eq!(outcome.example_count, 9);
}

#[tokio::test]
async fn test_dedup_without_embedder_is_config_error() {
    let temp = TempDir::new().unwrap();
    let mut opts = options(&temp);
    opts.dedup = true;

    let result = pipeline(Arc::new(FakeHub::default()), fake_registry(&[]))
        .run(&opts)
        .await;
    assert!(matches!(result, Err(DatasetError::Config(_))));
}

#[tokio::test]
async fn test_exec_sample_size_limits_checked_examples() {
    let temp = TempDir::new().unwrap();
    let mut opts = options(&temp);
    opts.exec_sample_size = 2;

    let outcome = pipeline(Arc::new(FakeHub::default()), fake_registry(&[]))
        .run(&opts)
        .await
        .unwrap();

    let report = outcome.execution.unwrap();
    assert_eq!(report.detailed.len(), 2);
}

#[tokio::test]
async fn test_execution_checker_error_blocks_publish_but_saves() {
    let temp = TempDir::new().unwrap();
    let hub = Arc::new(FakeHub::default());
    let mut opts = options(&temp);
    opts.push_to_hub = true;
    opts.hub_repo_id = Some("me/tools".to_string());

    let outcome = pipeline(hub.clone(), fake_registry(&[]))
        .with_execution_limits(0, None)
        .run(&opts)
        .await
        .unwrap();

    assert!(outcome.dataset_path.is_some());
    assert!(opts.dataset_path().exists());
    assert!(outcome.execution.is_none());
    assert!(outcome
        .publish_blocked
        .as_ref()
        .unwrap()
        .contains("Execution checker failed"));
    assert!(outcome.published.is_none());
    assert!(hub.pushes.lock().unwrap().is_empty());
}
