//! LLM-written multi-tool examples
//!
//! Two distinct tools are drawn per example with sampled arguments; the
//! model only writes the natural-language query.

use crate::dataset::catalog::tool_catalog;
use crate::dataset::generation::IdSequence;
use crate::dataset::prompts::create_multi_tool_prompt;
use crate::dataset::types::{Call, Example};
use crate::errors::Result;
use crate::llm::{ChatMessage, CompletionClient};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, error, info};

/// Tools combined per example
const TOOLS_PER_EXAMPLE: usize = 2;

/// Generate up to `count` multi-tool examples
///
/// Empty completions are skipped; the id is only consumed on success.
pub async fn generate_multi_tool_examples<R: Rng + Send + ?Sized>(
    llm: &dyn CompletionClient,
    few_shot: &[String],
    count: usize,
    ids: &mut IdSequence,
    rng: &mut R,
) -> Result<Vec<Example>> {
    info!(count, few_shot = few_shot.len(), "Generating multi-tool examples");
    let catalog = tool_catalog();
    let mut examples = Vec::with_capacity(count);

    for attempt in 1..=count {
        let selected: Vec<_> = catalog.choose_multiple(rng, TOOLS_PER_EXAMPLE).collect();

        let mut answers = Vec::with_capacity(selected.len());
        let mut tools = Vec::with_capacity(selected.len());
        let mut payload = Vec::with_capacity(selected.len());

        for tool in selected {
            let args = tool.sample_arguments(rng);
            payload.push(format!(
                "- {}({}) ➜ {}",
                tool.name,
                serde_json::to_string(&args)?,
                tool.description
            ));
            debug!(attempt, tool = tool.name, ?args, "Selected tool");
            answers.push(Call::new(tool.name, args));
            tools.push(tool.spec());
        }

        let prompt = create_multi_tool_prompt(&payload, few_shot);
        let query = llm.complete(&[ChatMessage::user(prompt)]).await?;
        let query = query.trim();

        if query.is_empty() {
            error!(attempt, "Skipping multi-tool example: empty LLM response");
            continue;
        }

        let id = ids.allocate();
        info!(id, "Generated multi-tool example");
        examples.push(Example::new(id, query, answers).with_tools(tools));
    }

    info!(generated = examples.len(), "Multi-tool examples done");
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DatasetError;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Replays canned replies and records prompts
    struct ScriptedLlm {
        replies: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.prompts.lock().unwrap().push(messages[0].content.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    #[tokio::test]
    async fn test_two_distinct_tools_per_example() {
        let llm = ScriptedLlm::new(vec![
            Ok("Lock my screen and mute audio".to_string()),
            Ok("  Search for bread and save a note  ".to_string()),
        ]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut ids = IdSequence::starting_at(10);

        let examples = generate_multi_tool_examples(&llm, &[], 2, &mut ids, &mut rng)
            .await
            .unwrap();

        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].id, 10);
        assert_eq!(examples[1].query, "Search for bread and save a note");
        for example in &examples {
            assert_eq!(example.answers.len(), 2);
            assert_ne!(example.answers[0].name, example.answers[1].name);
            assert_eq!(example.tools.len(), 2);
        }
    }

    #[tokio::test]
    async fn test_empty_reply_is_skipped_without_consuming_id() {
        let llm = ScriptedLlm::new(vec![Ok("   ".to_string()), Ok("Do both things".to_string())]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut ids = IdSequence::default();

        let examples = generate_multi_tool_examples(&llm, &[], 2, &mut ids, &mut rng)
            .await
            .unwrap();

        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].id, 1);
        assert_eq!(ids.peek(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let llm = ScriptedLlm::new(vec![Err(DatasetError::LlmApi("HTTP 500".to_string()))]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut ids = IdSequence::default();

        let result = generate_multi_tool_examples(&llm, &[], 1, &mut ids, &mut rng).await;
        assert!(matches!(result, Err(DatasetError::LlmApi(_))));
    }

    #[tokio::test]
    async fn test_few_shot_examples_reach_prompt() {
        let llm = ScriptedLlm::new(vec![Ok("q".to_string())]);
        let mut rng = StdRng::seed_from_u64(9);
        let mut ids = IdSequence::default();
        let few_shot = vec!["{\"query\": \"Find flights and book a hotel\"}".to_string()];

        generate_multi_tool_examples(&llm, &few_shot, 1, &mut ids, &mut rng)
            .await
            .unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Find flights and book a hotel"));
    }
}
