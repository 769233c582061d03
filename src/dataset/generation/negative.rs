//! Unknown-intent (negative) examples
//!
//! Requests no tool can serve; answers and tools are empty.

use crate::dataset::catalog::UNKNOWN_INTENTS;
use crate::dataset::generation::IdSequence;
use crate::dataset::types::Example;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

/// Generate `count` negative examples
pub fn generate_unknown_intent_examples<R: Rng + ?Sized>(
    count: usize,
    ids: &mut IdSequence,
    rng: &mut R,
) -> Vec<Example> {
    info!(count, start_id = ids.peek(), "Generating unknown intent examples");

    let examples: Vec<Example> = (0..count)
        .filter_map(|_| UNKNOWN_INTENTS.choose(rng))
        .map(|query| {
            let id = ids.allocate();
            debug!(id, query = *query, "Selected unknown intent");
            Example::new(id, *query, Vec::new())
        })
        .collect();

    info!(generated = examples.len(), next_id = ids.peek(), "Unknown intent examples done");
    examples
}
