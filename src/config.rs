//! Configuration management for callforge
//!
//! Precedence: built-in defaults, then the TOML file
//! (`~/.callforge/config.toml` or `--config`), then `.env` and the process
//! environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
}

/// Tokens and publish target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    pub huggingface_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub hf_dataset_repo_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    pub few_shot_examples_dataset: String,
    pub llm_model: String,
    pub llm_base_url: String,
    pub sentence_transformer_model: String,
    pub single_tool_examples_per_tool: usize,
    pub multi_tool_examples: usize,
    pub unknown_intent_examples: usize,
    pub paraphrase_count: usize,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            few_shot_examples_dataset: "Salesforce/xlam-function-calling-60k".to_string(),
            llm_model: crate::llm::DEFAULT_MODEL.to_string(),
            llm_base_url: crate::llm::DEFAULT_BASE_URL.to_string(),
            sentence_transformer_model: crate::embedding::engine::DEFAULT_MODEL_ID.to_string(),
            single_tool_examples_per_tool: 2,
            multi_tool_examples: 2,
            unknown_intent_examples: 2,
            paraphrase_count: 2,
        }
    }
}

/// Execution checker tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub concurrency_limit: usize,
    pub call_timeout_secs: Option<u64>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: crate::tools::DEFAULT_CONCURRENCY_LIMIT,
            call_timeout_secs: None,
        }
    }
}

impl ExecutionSettings {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

impl Settings {
    /// Load settings from `path` (or the default location) plus environment
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let mut settings = Self::from_file(&path)?;

        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "Loaded .env file");
        }
        settings.apply_env_overrides(|key| std::env::var(key).ok())?;

        Ok(settings)
    }

    /// Read the TOML file, or defaults when it does not exist
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("HUGGINGFACE_TOKEN") {
            self.auth.huggingface_token = Some(v);
        }
        if let Some(v) = non_empty("OPENAI_API_KEY") {
            self.auth.openai_api_key = Some(v);
        }
        if let Some(v) = non_empty("HF_DATASET_REPO_ID") {
            self.auth.hf_dataset_repo_id = Some(v);
        }
        if let Some(v) = non_empty("FEW_SHOT_EXAMPLES_DATASET") {
            self.dataset.few_shot_examples_dataset = v;
        }
        if let Some(v) = non_empty("LLM_MODEL") {
            self.dataset.llm_model = v;
        }
        if let Some(v) = non_empty("LLM_BASE_URL") {
            self.dataset.llm_base_url = v;
        }
        if let Some(v) = non_empty("SENTENCE_TRANSFORMER_MODEL") {
            self.dataset.sentence_transformer_model = v;
        }
        if let Some(v) = non_empty("EXEC_CONCURRENCY_LIMIT") {
            self.execution.concurrency_limit = v
                .trim()
                .parse()
                .with_context(|| format!("EXEC_CONCURRENCY_LIMIT is not a number: {}", v))?;
        }
        if let Some(v) = non_empty("EXEC_CALL_TIMEOUT_SECS") {
            let secs = v
                .trim()
                .parse()
                .with_context(|| format!("EXEC_CALL_TIMEOUT_SECS is not a number: {}", v))?;
            self.execution.call_timeout_secs = Some(secs);
        }

        Ok(())
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_string).context("Failed to write config file")?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".callforge").join("config.toml"))
    }
}
