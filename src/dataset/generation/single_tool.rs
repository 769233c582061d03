//! Template-based single-tool examples

use crate::dataset::catalog::ToolDefinition;
use crate::dataset::generation::IdSequence;
use crate::dataset::template::render_template;
use crate::dataset::types::{Call, Example};
use crate::errors::{DatasetError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

/// Generate `count` examples for one tool from its query templates
pub fn generate_single_tool_examples<R: Rng + ?Sized>(
    tool: &ToolDefinition,
    count: usize,
    ids: &mut IdSequence,
    rng: &mut R,
) -> Result<Vec<Example>> {
    info!(tool = tool.name, count, start_id = ids.peek(), "Generating single-tool examples");

    let mut examples = Vec::with_capacity(count);
    for _ in 0..count {
        let args = tool.sample_arguments(rng);
        let template = tool.templates.choose(rng).ok_or_else(|| {
            DatasetError::Template(format!("tool '{}' has no query templates", tool.name))
        })?;
        let query = render_template(template, &args)?;
        debug!(tool = tool.name, template = *template, query = %query, "Rendered query");

        examples.push(
            Example::new(ids.allocate(), query, vec![Call::new(tool.name, args)])
                .with_tools(vec![tool.spec()]),
        );
    }

    info!(tool = tool.name, generated = examples.len(), "Single-tool examples done");
    Ok(examples)
}
