//! Dataset build pipeline
//!
//! generate -> paraphrase -> (dedup) -> (format check) -> save ->
//! (execution check gate) -> (publish)

pub mod builder;

pub use builder::DatasetPipeline;

use crate::config::DatasetSettings;
use crate::dataset::clean::DEFAULT_SIMILARITY_THRESHOLD;
use crate::tools::ExecutionReport;
use std::path::PathBuf;

/// Options for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub single_tool_examples_per_tool: usize,
    pub multi_tool_examples: usize,
    pub unknown_intent_examples: usize,
    pub paraphrase_count: usize,

    /// Output file name inside `data_dir`
    pub dataset_name: String,
    pub data_dir: PathBuf,

    /// Include few-shot demonstrations in multi-tool prompts
    pub use_hf_examples: bool,
    pub hf_num_examples: usize,

    pub dedup: bool,
    pub similarity_threshold: f32,

    pub validate_format: bool,
    /// Abort before saving when the format check rejects anything
    pub fail_on_invalid: bool,
    pub format_report: Option<PathBuf>,

    pub push_to_hub: bool,
    pub hub_repo_id: Option<String>,
    pub hub_config_name: Option<String>,

    /// Required execution success, as a fraction in [0, 1]
    pub min_success_rate: f64,
    pub skip_execution_checker: bool,
    pub exec_sample_size: usize,

    /// Fixed RNG seed for reproducible sampling
    pub seed: Option<u64>,
}

impl BuildOptions {
    /// Options with generation counts taken from settings
    pub fn from_settings(settings: &DatasetSettings) -> Self {
        Self {
            single_tool_examples_per_tool: settings.single_tool_examples_per_tool,
            multi_tool_examples: settings.multi_tool_examples,
            unknown_intent_examples: settings.unknown_intent_examples,
            paraphrase_count: settings.paraphrase_count,
            dataset_name: "dataset.json".to_string(),
            data_dir: PathBuf::from("data"),
            use_hf_examples: true,
            hf_num_examples: 3,
            dedup: false,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            validate_format: false,
            fail_on_invalid: false,
            format_report: None,
            push_to_hub: false,
            hub_repo_id: None,
            hub_config_name: None,
            min_success_rate: 0.0,
            skip_execution_checker: false,
            exec_sample_size: 50,
            seed: None,
        }
    }

    /// Path the dataset is written to
    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset_name)
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from_settings(&DatasetSettings::default())
    }
}

/// Where a run published to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub repo_id: String,
    pub config_name: String,
}

/// What a pipeline run produced
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    /// Written dataset file; `None` when saving failed or was aborted
    pub dataset_path: Option<PathBuf>,

    /// Examples in the final dataset
    pub example_count: usize,

    /// `(valid, invalid)` counts when the format check ran
    pub format_counts: Option<(usize, usize)>,

    /// Stopped before saving because of invalid entries
    pub aborted: bool,

    /// Execution check over the leading sample, when it ran and completed
    pub execution: Option<ExecutionReport>,

    /// Why publishing was disabled, if it was
    pub publish_blocked: Option<String>,

    pub published: Option<Publication>,
}
