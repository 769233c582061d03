//! LLM paraphrasing of existing examples
//!
//! A paraphrase keeps the source example's answers and tools and only
//! rewrites the query.

use crate::dataset::generation::IdSequence;
use crate::dataset::prompts::create_paraphrase_prompt;
use crate::dataset::types::Example;
use crate::errors::Result;
use crate::llm::{ChatMessage, CompletionClient};
use tracing::{info, warn};

/// Rewrite one query; `None` when the model returned nothing
pub async fn paraphrase_query(llm: &dyn CompletionClient, query: &str) -> Result<Option<String>> {
    let prompt = create_paraphrase_prompt(query);
    let reply = llm.complete(&[ChatMessage::user(prompt)]).await?;
    let reply = reply.trim();

    if reply.is_empty() {
        warn!(query = %query, "Could not extract paraphrase");
        Ok(None)
    } else {
        Ok(Some(reply.to_string()))
    }
}

/// Paraphrase the leading `count` examples of `dataset`
///
/// Failed, empty and identical paraphrases are skipped. New examples take
/// ids from `ids`.
pub async fn paraphrase_dataset(
    llm: &dyn CompletionClient,
    dataset: &[Example],
    count: usize,
    ids: &mut IdSequence,
) -> Vec<Example> {
    let selected = count.min(dataset.len());
    if selected == 0 {
        info!("No examples selected for paraphrasing");
        return Vec::new();
    }

    info!(selected, "Starting paraphrasing");
    let mut paraphrased = Vec::new();

    for (i, source) in dataset.iter().take(selected).enumerate() {
        let rewritten = match paraphrase_query(llm, &source.query).await {
            Ok(rewritten) => rewritten,
            Err(e) => {
                warn!(id = source.id, error = %e, "Paraphrasing request failed");
                None
            }
        };

        match rewritten {
            Some(query) if query != source.query => {
                let id = ids.allocate();
                info!(source_id = source.id, id, original = %source.query, paraphrase = %query, "Paraphrased");
                paraphrased.push(Example {
                    id,
                    query,
                    answers: source.answers.clone(),
                    tools: source.tools.clone(),
                });
            }
            Some(_) => info!(id = source.id, "Paraphrase identical to original, skipping"),
            None => warn!(id = source.id, "Skipping example: no paraphrase"),
        }

        if (i + 1) % 20 == 0 {
            info!(done = i + 1, selected, "Paraphrasing progress");
        }
    }

    info!(generated = paraphrased.len(), "Finished paraphrasing");
    paraphrased
}
