//! Near-duplicate removal and decontamination
//!
//! Queries are compared by cosine similarity of their embeddings. An entry
//! is dropped when its query is shorter than 5 characters, too close to an
//! already kept query, or too close to any reference query.

use crate::dataset::types::Example;
use crate::embedding::{cosine_similarity, Embedder};
use anyhow::Result;
use tracing::{debug, info};

/// Default cosine similarity above which two queries count as the same
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.85;

const MIN_QUERY_CHARS: usize = 5;

/// Drop near-duplicates and entries resembling `reference_queries`
pub fn deduplicate_and_decontaminate(
    dataset: Vec<Example>,
    reference_queries: &[String],
    similarity_threshold: f32,
    embedder: &dyn Embedder,
) -> Result<Vec<Example>> {
    let candidates: Vec<Example> = dataset
        .into_iter()
        .filter(|e| e.query.trim().chars().count() >= MIN_QUERY_CHARS)
        .collect();

    let queries: Vec<&str> = candidates.iter().map(|e| e.query.trim()).collect();
    let embeddings = embedder.embed_batch(&queries)?;

    let references: Vec<&str> = reference_queries.iter().map(String::as_str).collect();
    let reference_embeddings = embedder.embed_batch(&references)?;

    let before = candidates.len();
    let mut kept: Vec<Example> = Vec::with_capacity(before);
    let mut seen: Vec<Vec<f32>> = Vec::new();

    for (entry, embedding) in candidates.into_iter().zip(embeddings) {
        let is_close = |other: &Vec<f32>| cosine_similarity(&embedding, other) > similarity_threshold;

        if seen.iter().any(is_close) {
            debug!(id = entry.id, "Dropping near-duplicate");
            continue;
        }
        if reference_embeddings.iter().any(is_close) {
            debug!(id = entry.id, "Dropping contaminated entry");
            continue;
        }

        seen.push(embedding);
        kept.push(entry);
    }

    info!(before, after = kept.len(), "Deduplication finished");
    Ok(kept)
}
