//! Dataset record types
//!
//! The JSON shape matches the published dataset files: an array of
//! `{id, query, answers, tools}` objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keyword arguments for a single call
pub type Arguments = Map<String, Value>;

/// One expected function invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Function name, looked up in the registry at execution time
    pub name: String,

    /// Keyword arguments
    #[serde(default)]
    pub arguments: Arguments,
}

impl Call {
    /// Create a call with the given arguments
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Create a call without arguments
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Arguments::new())
    }
}

/// Tool description shipped alongside an example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,

    /// Parameter name -> `{description, type}`
    #[serde(default)]
    pub parameters: Value,
}

/// One dataset record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Unique across the whole generation run
    pub id: u64,

    /// Natural-language instruction
    pub query: String,

    /// Calls the instruction should produce (empty for unknown intents)
    #[serde(default)]
    pub answers: Vec<Call>,

    /// Tools relevant to this example
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
}

impl Example {
    /// Create an example with no tools attached
    pub fn new(id: u64, query: impl Into<String>, answers: Vec<Call>) -> Self {
        Self {
            id,
            query: query.into(),
            answers,
            tools: Vec::new(),
        }
    }

    /// Attach tool descriptions
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Whether this is an unknown-intent (negative) example
    pub fn is_negative(&self) -> bool {
        self.answers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_example_deserializes_dataset_record() {
        let raw = json!({
            "id": 7,
            "query": "Set volume to 30",
            "answers": [{"name": "set_volume", "arguments": {"level": 30}}],
            "tools": [{
                "name": "set_volume",
                "description": "Sets system volume (0-100).",
                "parameters": {"level": {"description": "Volume level", "type": "int"}}
            }]
        });

        let example: Example = serde_json::from_value(raw).unwrap();
        assert_eq!(example.id, 7);
        assert_eq!(example.answers[0].name, "set_volume");
        assert_eq!(example.answers[0].arguments["level"], json!(30));
        assert_eq!(example.tools.len(), 1);
        assert!(!example.is_negative());
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let example: Example =
            serde_json::from_value(json!({"id": 1, "query": "Book a flight to Paris."})).unwrap();
        assert!(example.answers.is_empty());
        assert!(example.tools.is_empty());
        assert!(example.is_negative());
    }

    #[test]
    fn test_call_without_arguments_field() {
        let call: Call = serde_json::from_value(json!({"name": "lock_screen"})).unwrap();
        assert_eq!(call, Call::bare("lock_screen"));
    }
}
