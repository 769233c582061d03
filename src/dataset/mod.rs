//! Dataset model, generation and cleanup
//!
//! - `types`: the `{id, query, answers, tools}` record format
//! - `catalog`: tool descriptions, sample arguments and query templates
//! - `generation`: single-tool, multi-tool, unknown-intent and paraphrased examples
//! - `format_check` / `clean`: LLM validation and embedding-based deduplication
//! - `store`: JSON persistence

pub mod catalog;
pub mod clean;
pub mod format_check;
pub mod generation;
pub mod prompts;
pub mod store;
pub mod template;
pub mod types;

pub use catalog::{tool_catalog, ToolDefinition, UNKNOWN_INTENTS};
pub use format_check::{FormatReport, InvalidEntry};
pub use generation::IdSequence;
pub use store::{load_examples, save_json};
pub use types::{Arguments, Call, Example, ToolSpec};
