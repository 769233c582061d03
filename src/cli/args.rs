//! Command-line argument parsing for callforge
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::config::Settings;
use crate::pipeline::BuildOptions;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// callforge - Synthesize and execution-check function-calling datasets
#[derive(Parser, Debug)]
#[command(name = "callforge")]
#[command(version)]
#[command(about = "Generate, validate and publish function-calling datasets", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors and the final summary only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a dataset, optionally validate, gate and publish it
    Build(BuildArgs),

    /// Execution-check an existing dataset file
    Check(CheckArgs),

    /// List the tool catalog and registered functions
    Tools,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Number of examples per single tool
    #[arg(long)]
    pub single_tool_examples: Option<usize>,

    /// Number of multi-tool examples
    #[arg(long)]
    pub multi_tool_examples: Option<usize>,

    /// Number of unknown intent examples
    #[arg(long)]
    pub unknown_intent_examples: Option<usize>,

    /// Number of examples to paraphrase
    #[arg(long)]
    pub paraphrase_count: Option<usize>,

    /// Output dataset filename
    #[arg(long, default_value = "dataset.json")]
    pub dataset_name: String,

    /// Directory the dataset is written to
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Number of HF few-shot examples to include in multi-tool prompts
    #[arg(long, default_value_t = 3)]
    pub hf_examples: usize,

    /// Disable using HF few-shot examples in multi-tool prompts
    #[arg(long)]
    pub no_hf_examples: bool,

    /// Drop near-duplicate queries using sentence embeddings
    #[arg(long)]
    pub dedup: bool,

    /// Cosine similarity above which queries count as duplicates
    #[arg(long, default_value_t = 0.85)]
    pub similarity_threshold: f32,

    /// Validate dataset entries with an LLM format checker before saving
    #[arg(long)]
    pub validate_format: bool,

    /// If validation finds invalid entries, abort saving
    #[arg(long)]
    pub fail_on_invalid: bool,

    /// Optional path to write a JSON report of invalid entries
    #[arg(long)]
    pub format_report: Option<PathBuf>,

    /// Push the final dataset to Hugging Face Hub
    #[arg(long)]
    pub push_to_hub: bool,

    /// Target HF repo id (falls back to HF_DATASET_REPO_ID)
    #[arg(long)]
    pub hub_repo_id: Option<String>,

    /// Optional Hub config/version name, e.g. v0.3
    #[arg(long)]
    pub hub_config_name: Option<String>,

    /// Minimum execution success rate (0.0-1.0) required to push
    #[arg(long, default_value_t = 0.0, value_parser = parse_fraction)]
    pub min_success_rate: f64,

    /// Skip execution checker gating before pushing
    #[arg(long)]
    pub skip_execution_checker: bool,

    /// Number of examples to sample for execution checker
    #[arg(long, default_value_t = 50)]
    pub exec_sample_size: usize,

    /// Seed for reproducible sampling
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CheckArgs {
    /// Dataset file to check
    #[arg(long, default_value = "data/dataset.json")]
    pub dataset: PathBuf,

    /// Number of leading records to check
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Concurrent calls (defaults to the configured limit)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-call timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Where to write the JSON report
    #[arg(long, default_value = "execution_report.json")]
    pub report: PathBuf,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl BuildArgs {
    /// Resolve into pipeline options; unset counts come from settings
    pub fn to_options(&self, settings: &Settings) -> BuildOptions {
        let defaults = &settings.dataset;
        BuildOptions {
            single_tool_examples_per_tool: self
                .single_tool_examples
                .unwrap_or(defaults.single_tool_examples_per_tool),
            multi_tool_examples: self.multi_tool_examples.unwrap_or(defaults.multi_tool_examples),
            unknown_intent_examples: self
                .unknown_intent_examples
                .unwrap_or(defaults.unknown_intent_examples),
            paraphrase_count: self.paraphrase_count.unwrap_or(defaults.paraphrase_count),
            dataset_name: self.dataset_name.clone(),
            data_dir: self.data_dir.clone(),
            use_hf_examples: !self.no_hf_examples,
            hf_num_examples: self.hf_examples,
            dedup: self.dedup,
            similarity_threshold: self.similarity_threshold,
            validate_format: self.validate_format,
            fail_on_invalid: self.fail_on_invalid,
            format_report: self.format_report.clone(),
            push_to_hub: self.push_to_hub,
            hub_repo_id: self.hub_repo_id.clone(),
            hub_config_name: self.hub_config_name.clone(),
            min_success_rate: self.min_success_rate,
            skip_execution_checker: self.skip_execution_checker,
            exec_sample_size: self.exec_sample_size,
            seed: self.seed,
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show detailed events
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

fn parse_fraction(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is outside 0.0-1.0", value))
    }
}
