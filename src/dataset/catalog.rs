//! Tool catalog used for generation
//!
//! Each entry carries the description and parameter schema shown to the
//! model, sample argument values, and query templates for single-tool
//! examples.

use crate::dataset::types::{Arguments, ToolSpec};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};

/// Catalog entry for one tool
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,

    /// Parameter name -> `{description, type}`
    pub parameters: Value,

    /// Parameter name -> candidate values, in declaration order
    pub sample_args: Vec<(&'static str, Vec<Value>)>,

    /// Instruction templates with `{param}` placeholders
    pub templates: Vec<&'static str>,
}

impl ToolDefinition {
    /// Draw one value per parameter
    pub fn sample_arguments<R: Rng + ?Sized>(&self, rng: &mut R) -> Arguments {
        let mut args = Arguments::new();
        for (name, candidates) in &self.sample_args {
            if let Some(value) = candidates.choose(rng) {
                args.insert((*name).to_string(), value.clone());
            }
        }
        args
    }

    /// Description attached to generated examples
    pub fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.to_string(),
            description: self.description.to_string(),
            parameters: self.parameters.clone(),
        }
    }
}

/// Queries the assistant cannot fulfil with any tool
pub const UNKNOWN_INTENTS: &[&str] = &[
    "What's the weather like today?",
    "Book a flight to Paris.",
    "Who won the football match?",
    "Send an email to my boss.",
    "Translate 'hello' to Japanese.",
];

/// All tools available for generation, in a stable order
pub fn tool_catalog() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "lock_screen",
            description: "Locks the laptop screen.",
            parameters: json!({}),
            sample_args: vec![],
            templates: vec!["Lock the screen", "Please lock my laptop", "Activate screen lock"],
        },
        ToolDefinition {
            name: "get_battery_status",
            description: "Returns battery level and charging status.",
            parameters: json!({}),
            sample_args: vec![],
            templates: vec!["What's my battery status?", "Is my laptop charging?"],
        },
        ToolDefinition {
            name: "search_google",
            description: "Searches Google for a query.",
            parameters: json!({"query": {"description": "Search query", "type": "str"}}),
            sample_args: vec![(
                "query",
                vec![
                    json!("how to bake bread"),
                    json!("latest AI news"),
                    json!("best python tips"),
                ],
            )],
            templates: vec!["Search Google for '{query}'", "Can you search: {query}?"],
        },
        ToolDefinition {
            name: "set_volume",
            description: "Sets system volume (0–100).",
            parameters: json!({"level": {"description": "Volume level", "type": "int"}}),
            sample_args: vec![("level", vec![json!(10), json!(30), json!(50), json!(70), json!(90)])],
            templates: vec!["Set volume to {level}", "Adjust sound to {level} percent"],
        },
        ToolDefinition {
            name: "create_note",
            description: "Creates a note using the Notes app.",
            parameters: json!({
                "title": {"description": "Title of the note", "type": "str"},
                "content": {"description": "Content of the note", "type": "str"}
            }),
            sample_args: vec![
                ("title", vec![json!("Groceries"), json!("Project Ideas")]),
                ("content", vec![json!("Buy milk and eggs"), json!("Build an AI assistant")]),
            ],
            templates: vec![
                "Create note '{title}' with content '{content}'",
                "Make a new note: {title} - {content}",
            ],
        },
    ]
}
