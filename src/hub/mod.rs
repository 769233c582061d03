//! Dataset hub collaborators
//!
//! Publishing and few-shot retrieval sit behind traits so the pipeline can
//! run against in-memory fakes.

pub mod client;
pub mod version;

pub use client::{HubClient, DEFAULT_DATASETS_SERVER_URL, DEFAULT_HUB_URL};
pub use version::next_version_tag;

use crate::dataset::types::Example;
use crate::errors::Result;
use async_trait::async_trait;

/// Destination for published datasets
#[async_trait]
pub trait DatasetHub: Send + Sync {
    /// Every file path in the dataset repository
    async fn list_files(&self, repo_id: &str) -> Result<Vec<String>>;

    /// Upload `examples` as config `config_name`
    async fn push(&self, repo_id: &str, config_name: &str, examples: &[Example]) -> Result<()>;
}

/// Source of demonstration records for multi-tool prompts
#[async_trait]
pub trait FewShotSource: Send + Sync {
    /// Up to `count` records of `dataset`, each rendered as indented JSON
    async fn fetch_examples(&self, dataset: &str, count: usize) -> Result<Vec<String>>;
}
