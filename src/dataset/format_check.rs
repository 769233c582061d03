//! LLM-based format validation
//!
//! Each entry is serialized and judged by the model; a reply starting with
//! `VALID` accepts it, anything else is recorded as the rejection reason.

use crate::dataset::prompts::{create_format_check_message, FORMAT_CHECK_PROMPT};
use crate::dataset::types::Example;
use crate::errors::Result;
use crate::llm::{ChatMessage, CompletionClient};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One rejected entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidEntry {
    pub id: u64,
    pub reason: String,
}

/// Report written by `--format-report`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatReport {
    pub valid_count: usize,
    pub invalid_count: usize,
    pub invalid: Vec<InvalidEntry>,
}

impl FormatReport {
    pub fn new(valid_count: usize, invalid: Vec<InvalidEntry>) -> Self {
        Self {
            valid_count,
            invalid_count: invalid.len(),
            invalid,
        }
    }
}

/// Ask the model to judge one entry; returns its raw verdict
pub async fn check_entry_format(llm: &dyn CompletionClient, entry: &Example) -> Result<String> {
    let entry_json = serde_json::to_string_pretty(entry)?;
    let messages = [
        ChatMessage::system(FORMAT_CHECK_PROMPT),
        ChatMessage::user(create_format_check_message(&entry_json)),
    ];

    let verdict = llm.complete(&messages).await?;
    debug!(id = entry.id, verdict = %verdict, "Format verdict");
    Ok(verdict.trim().to_string())
}

/// Split `dataset` into accepted entries and rejections
pub async fn run_format_checker(
    llm: &dyn CompletionClient,
    dataset: Vec<Example>,
) -> Result<(Vec<Example>, Vec<InvalidEntry>)> {
    let mut valid = Vec::with_capacity(dataset.len());
    let mut invalid = Vec::new();

    for entry in dataset {
        let verdict = check_entry_format(llm, &entry).await?;
        if verdict.starts_with("VALID") {
            valid.push(entry);
        } else {
            invalid.push(InvalidEntry {
                id: entry.id,
                reason: verdict,
            });
        }
    }

    info!(valid = valid.len(), invalid = invalid.len(), "Format check finished");
    Ok((valid, invalid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::Call;
    use async_trait::async_trait;

    /// Rejects entries whose serialized form has no answers
    struct StrictLlm;

    #[async_trait]
    impl CompletionClient for StrictLlm {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            assert_eq!(messages[0].role, "system");
            if messages[1].content.contains("\"answers\": []") {
                Ok("INVALID ❌: answers must not be empty".to_string())
            } else {
                Ok("VALID ✅".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_run_format_checker_partitions() {
        let dataset = vec![
            Example::new(1, "Lock the screen", vec![Call::bare("lock_screen")]),
            Example::new(2, "Book a flight to Paris.", vec![]),
        ];

        let (valid, invalid) = run_format_checker(&StrictLlm, dataset).await.unwrap();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].id, 1);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].id, 2);
        assert!(invalid[0].reason.starts_with("INVALID"));
    }

    #[test]
    fn test_format_report_shape() {
        let report = FormatReport::new(
            3,
            vec![InvalidEntry {
                id: 4,
                reason: "INVALID ❌: missing tools".to_string(),
            }],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid_count"], 3);
        assert_eq!(json["invalid_count"], 1);
        assert_eq!(json["invalid"][0]["id"], 4);
    }
}
