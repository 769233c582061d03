//! Pipeline orchestration
//!
//! Collaborators (LLM, hub, few-shot source, embedder, function registry)
//! are injected, so runs can be driven entirely by fakes.

use crate::dataset::catalog::tool_catalog;
use crate::dataset::clean::deduplicate_and_decontaminate;
use crate::dataset::format_check::{run_format_checker, FormatReport};
use crate::dataset::generation::{
    generate_multi_tool_examples, generate_single_tool_examples, generate_unknown_intent_examples,
    paraphrase_dataset, IdSequence,
};
use crate::dataset::store::save_json;
use crate::dataset::types::Example;
use crate::embedding::Embedder;
use crate::errors::{DatasetError, Result};
use crate::hub::{next_version_tag, DatasetHub, FewShotSource};
use crate::llm::CompletionClient;
use crate::pipeline::{BuildOptions, PipelineOutcome, Publication};
use crate::tools::{ExecutionChecker, FunctionRegistry, DEFAULT_CONCURRENCY_LIMIT};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// End-to-end dataset builder
pub struct DatasetPipeline {
    llm: Arc<dyn CompletionClient>,
    few_shot: Arc<dyn FewShotSource>,
    hub: Arc<dyn DatasetHub>,
    registry: Arc<dyn FunctionRegistry>,
    embedder: Option<Arc<dyn Embedder>>,

    /// Dataset few-shot demonstrations are read from
    few_shot_dataset: String,

    /// Used when options carry no hub repo id
    default_repo_id: Option<String>,

    concurrency_limit: usize,
    call_timeout: Option<Duration>,

    /// Show spinners for long stages
    show_progress: bool,
}

impl DatasetPipeline {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        few_shot: Arc<dyn FewShotSource>,
        hub: Arc<dyn DatasetHub>,
        registry: Arc<dyn FunctionRegistry>,
    ) -> Self {
        Self {
            llm,
            few_shot,
            hub,
            registry,
            embedder: None,
            few_shot_dataset: "Salesforce/xlam-function-calling-60k".to_string(),
            default_repo_id: None,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            call_timeout: None,
            show_progress: false,
        }
    }

    /// Set embedder used by deduplication
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set few-shot dataset name
    pub fn with_few_shot_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.few_shot_dataset = dataset.into();
        self
    }

    /// Set fallback hub repo id
    pub fn with_default_repo_id(mut self, repo_id: Option<String>) -> Self {
        self.default_repo_id = repo_id;
        self
    }

    /// Set execution checker limits
    pub fn with_execution_limits(mut self, concurrency_limit: usize, call_timeout: Option<Duration>) -> Self {
        self.concurrency_limit = concurrency_limit;
        self.call_timeout = call_timeout;
        self
    }

    /// Enable stage spinners
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run every stage
    ///
    /// Generation and format-check errors abort the run. Save, execution
    /// check and publish failures are logged and reflected in the outcome.
    pub async fn run(&self, options: &BuildOptions) -> Result<PipelineOutcome> {
        info!("Starting dataset generation pipeline");
        let mut outcome = PipelineOutcome::default();
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut ids = IdSequence::default();

        let few_shot = self.load_few_shot(options).await;

        // Base dataset
        let stage = self.stage("Generating examples");
        let mut dataset = Vec::new();
        for tool in tool_catalog() {
            dataset.extend(generate_single_tool_examples(
                &tool,
                options.single_tool_examples_per_tool,
                &mut ids,
                &mut rng,
            )?);
        }
        let multi = generate_multi_tool_examples(
            self.llm.as_ref(),
            &few_shot,
            options.multi_tool_examples,
            &mut ids,
            &mut rng,
        )
        .await?;
        dataset.extend(multi);
        dataset.extend(generate_unknown_intent_examples(
            options.unknown_intent_examples,
            &mut ids,
            &mut rng,
        ));
        stage.finish_and_clear();
        info!(examples = dataset.len(), "Generated base dataset");

        if options.paraphrase_count > 0 {
            let stage = self.stage("Paraphrasing");
            let paraphrased =
                paraphrase_dataset(self.llm.as_ref(), &dataset, options.paraphrase_count, &mut ids).await;
            stage.finish_and_clear();
            info!(added = paraphrased.len(), "Added paraphrased examples");
            dataset.extend(paraphrased);
        } else {
            info!("Skipping paraphrasing, paraphrase_count is 0");
        }

        if options.dedup {
            dataset = self.deduplicate(dataset, &few_shot, options.similarity_threshold).await?;
        }

        if options.validate_format {
            let stage = self.stage("Validating format");
            let (valid, invalid) = run_format_checker(self.llm.as_ref(), dataset).await?;
            stage.finish_and_clear();
            outcome.format_counts = Some((valid.len(), invalid.len()));

            if let Some(path) = &options.format_report {
                let report = FormatReport::new(valid.len(), invalid.clone());
                match save_json(path, &report) {
                    Ok(()) => info!(path = %path.display(), "Wrote format report"),
                    Err(e) => error!(path = %path.display(), error = %e, "Failed to write format report"),
                }
            }

            if options.fail_on_invalid && !invalid.is_empty() {
                error!(invalid = invalid.len(), "Invalid entries found and fail_on_invalid is set; aborting save");
                outcome.aborted = true;
                return Ok(outcome);
            }

            dataset = valid;
        }

        outcome.example_count = dataset.len();
        let out_path = options.dataset_path();
        match save_json(&out_path, &dataset) {
            Ok(()) => {
                info!(path = %out_path.display(), examples = dataset.len(), "Saved final dataset");
                outcome.dataset_path = Some(out_path);
            }
            Err(e) => error!(path = %out_path.display(), error = %e, "Failed to save dataset"),
        }

        let mut push_to_hub = options.push_to_hub;
        if !options.skip_execution_checker {
            if let Some(reason) = self.execution_gate(&dataset, options, &mut outcome).await {
                error!(reason = %reason, "Publishing disabled");
                outcome.publish_blocked = Some(reason);
                push_to_hub = false;
            }
        }

        if push_to_hub {
            outcome.published = self.publish(&dataset, options).await;
        }

        info!("Dataset generation pipeline finished");
        Ok(outcome)
    }

    /// Few-shot demonstrations; failures degrade to none
    async fn load_few_shot(&self, options: &BuildOptions) -> Vec<String> {
        if !options.use_hf_examples || options.hf_num_examples == 0 || options.multi_tool_examples == 0 {
            return Vec::new();
        }

        match self
            .few_shot
            .fetch_examples(&self.few_shot_dataset, options.hf_num_examples)
            .await
        {
            Ok(examples) => examples,
            Err(e) => {
                warn!(dataset = %self.few_shot_dataset, error = %e, "Failed to load few-shot examples, continuing without");
                Vec::new()
            }
        }
    }

    /// Remove near duplicates and queries resembling the few-shot demonstrations
    async fn deduplicate(&self, dataset: Vec<Example>, few_shot: &[String], threshold: f32) -> Result<Vec<Example>> {
        let embedder = self.embedder.clone().ok_or_else(|| {
            DatasetError::Config("deduplication requested but no embedder is configured".to_string())
        })?;
        let references = few_shot_queries(few_shot);

        let stage = self.stage("Deduplicating");
        let cleaned = tokio::task::spawn_blocking(move || {
            deduplicate_and_decontaminate(dataset, &references, threshold, embedder.as_ref())
        })
        .await
        .map_err(|e| DatasetError::Infrastructure(format!("deduplication task failed: {}", e)))??;
        stage.finish_and_clear();

        Ok(cleaned)
    }

    /// Run the execution check on the leading sample; returns why publishing must stop
    async fn execution_gate(
        &self,
        dataset: &[Example],
        options: &BuildOptions,
        outcome: &mut PipelineOutcome,
    ) -> Option<String> {
        let sample = &dataset[..options.exec_sample_size.min(dataset.len())];
        info!(sample = sample.len(), "Running execution checker on a sample of the dataset");

        let checker = match ExecutionChecker::new(self.registry.clone(), self.concurrency_limit) {
            Ok(checker) => checker,
            Err(e) => return Some(format!("Execution checker failed: {}", e)),
        };
        let checker = match self.call_timeout {
            Some(timeout) => checker.with_call_timeout(timeout),
            None => checker,
        };

        let stage = self.stage("Checking execution");
        let result = checker.run(sample).await;
        stage.finish_and_clear();

        match result {
            Ok(report) => {
                info!(
                    calls = report.total_function_calls,
                    success_rate = report.success_rate,
                    "Execution check complete"
                );
                let threshold = options.min_success_rate * 100.0;
                let blocked = (report.success_rate < threshold).then(|| {
                    format!(
                        "Success rate {:.2}% is below threshold {:.2}%",
                        report.success_rate, threshold
                    )
                });
                outcome.execution = Some(report);
                blocked
            }
            Err(e) => Some(format!("Execution checker failed: {}", e)),
        }
    }

    /// Publish the dataset; every failure is logged and yields `None`
    async fn publish(&self, dataset: &[Example], options: &BuildOptions) -> Option<Publication> {
        let repo_id = match options.hub_repo_id.clone().or_else(|| self.default_repo_id.clone()) {
            Some(repo_id) => repo_id,
            None => {
                error!("No Hub repo id provided. Set --hub-repo-id or HF_DATASET_REPO_ID.");
                return None;
            }
        };

        let config_name = match &options.hub_config_name {
            Some(name) => name.clone(),
            None => match self.hub.list_files(&repo_id).await {
                Ok(files) => {
                    let tag = next_version_tag(&files);
                    info!(config = %tag, "Auto-selected config name");
                    tag
                }
                Err(e) => {
                    warn!(error = %e, "Could not check existing versions on Hub, defaulting to v0");
                    "v0".to_string()
                }
            },
        };

        info!(repo = %repo_id, config = %config_name, "Pushing dataset to Hub");
        match self.hub.push(&repo_id, &config_name, dataset).await {
            Ok(()) => {
                info!(repo = %repo_id, config = %config_name, "Pushed dataset to Hub");
                Some(Publication { repo_id, config_name })
            }
            Err(e) => {
                error!(repo = %repo_id, error = %e, "Failed to push dataset to Hub");
                None
            }
        }
    }

    fn stage(&self, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// `query` fields of few-shot records, for decontamination
fn few_shot_queries(few_shot: &[String]) -> Vec<String> {
    few_shot
        .iter()
        .filter_map(|record| serde_json::from_str::<serde_json::Value>(record).ok())
        .filter_map(|value| value.get("query").and_then(|q| q.as_str()).map(str::to_string))
        .collect()
}
