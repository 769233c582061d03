//! Prompt templates for generation and validation

/// System prompt for the LLM format checker
pub const FORMAT_CHECK_PROMPT: &str = r#"You are a dataset validation expert. Your task is to validate the format of JSON entries used in a function-calling dataset.

Each entry must follow this strict format:

- "id": an integer
- "query": a non-empty natural language instruction
- "answers": a list of one or more dicts with:
  - "name": a string (function name)
  - "arguments": a dictionary of named arguments and their values
- "tools": a list of one or more dicts with:
  - "name": same string as in answers
  - "description": string
  - "parameters": a dictionary of parameter names and types

Respond ONLY with:
- `VALID ✅` if everything is perfect
- `INVALID ❌: <reason>` if there's any format issue"#;

/// Prompt asking for one natural instruction that needs every listed tool
///
/// `tool_payload` holds one `- name(args) ➜ description` line per tool.
/// `few_shot` examples, if any, are appended as numbered blocks.
pub fn create_multi_tool_prompt(tool_payload: &[String], few_shot: &[String]) -> String {
    let mut prompt = format!(
        r#"You are an AI data generation expert. Your goal is to write **clear, natural-sounding user instructions** that require the AI assistant to **use multiple tools at once** to complete the task.

---

Tools available to the assistant:
{}

---

Your task:
Generate a **realistic user instruction** (like one you'd say to a smart assistant or a chatbot) that **requires using BOTH tools** to fulfill the request. Make sure the instruction is:

1. **Specific**: Include clear details (like timeframes, names, locations, etc.).
2. **Natural**: Make it sound like a real request someone would make.
3. **Multi-functional**: The task should truly require both tools. Avoid simplistic or single-tool requests.

---

Output format:
Just write the user instruction as plain text. Do **not** describe how the tools are used, just the instruction."#,
        tool_payload.join("\n")
    );

    if !few_shot.is_empty() {
        prompt.push_str("\n\nExamples of high-quality multi-tool instructions:\n");
        for (i, example) in few_shot.iter().enumerate() {
            prompt.push_str(&format!("\nExample {}:\n{}\n", i + 1, example));
        }
    }

    prompt.trim().to_string()
}

/// Prompt asking for a meaning-preserving rewrite of `query`
pub fn create_paraphrase_prompt(query: &str) -> String {
    format!(
        "Paraphrase the following sentence while keeping its meaning and intention the same. \
         Make it sound natural and human-like.\n\nInput: {}\nParaphrase:",
        query
    )
}

/// User message for checking one serialized entry
pub fn create_format_check_message(entry_json: &str) -> String {
    format!(
        "Validate the following entry:\n\n```json\n{}\n```",
        entry_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_tool_prompt_lists_tools() {
        let payload = vec![
            "- lock_screen({}) ➜ Locks the laptop screen.".to_string(),
            "- set_volume({\"level\":30}) ➜ Sets system volume (0–100).".to_string(),
        ];
        let prompt = create_multi_tool_prompt(&payload, &[]);

        assert!(prompt.contains("- lock_screen({})"));
        assert!(prompt.contains("set_volume"));
        assert!(!prompt.contains("Example 1:"));
    }

    #[test]
    fn test_multi_tool_prompt_with_few_shot() {
        let prompt = create_multi_tool_prompt(
            &["- a".to_string()],
            &["{\"query\": \"x\"}".to_string(), "{\"query\": \"y\"}".to_string()],
        );
        assert!(prompt.contains("Example 1:\n{\"query\": \"x\"}"));
        assert!(prompt.contains("Example 2:"));
        assert!(!prompt.ends_with('\n'));
    }

    #[test]
    fn test_paraphrase_prompt_embeds_query() {
        let prompt = create_paraphrase_prompt("Lock the screen");
        assert!(prompt.contains("Input: Lock the screen"));
        assert!(prompt.ends_with("Paraphrase:"));
    }
}
