//! Dataset file persistence
//!
//! Datasets and reports are single pretty-printed JSON documents.

use crate::dataset::types::Example;
use crate::errors::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load examples from a JSON array file, keeping at most `limit` leading records
pub fn load_examples(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<Example>> {
    let json = fs::read_to_string(path.as_ref())?;
    let mut examples: Vec<Example> = serde_json::from_str(&json)?;

    if let Some(limit) = limit {
        examples.truncate(limit);
    }

    Ok(examples)
}

/// Write any serializable value as indented JSON, creating parent directories
pub fn save_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
