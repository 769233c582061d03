//! Query template rendering
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.

use crate::dataset::types::Arguments;
use crate::errors::{DatasetError, Result};
use serde_json::Value;

/// Render a template, substituting each placeholder with its argument value
pub fn render_template(template: &str, args: &Arguments) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(DatasetError::Template(format!(
                                "unclosed placeholder in '{}'",
                                template
                            )))
                        }
                    }
                }
                let value = args.get(&name).ok_or_else(|| {
                    DatasetError::Template(format!("no argument for placeholder '{}'", name))
                })?;
                out.push_str(&display_value(value));
            }
            '}' => {
                return Err(DatasetError::Template(format!(
                    "single '}}' encountered in '{}'",
                    template
                )))
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_string_and_number() {
        let rendered = render_template(
            "Create note '{title}' at {level}",
            &args(json!({"title": "Groceries", "level": 30})),
        )
        .unwrap();
        assert_eq!(rendered, "Create note 'Groceries' at 30");
    }

    #[test]
    fn test_render_without_placeholders() {
        let rendered = render_template("Lock the screen", &Arguments::new()).unwrap();
        assert_eq!(rendered, "Lock the screen");
    }

    #[test]
    fn test_escaped_braces() {
        let rendered = render_template("{{literal}} {q}", &args(json!({"q": "x"}))).unwrap();
        assert_eq!(rendered, "{literal} x");
    }

    #[test]
    fn test_missing_argument_is_error() {
        let err = render_template("Search {query}", &Arguments::new()).unwrap_err();
        assert!(err.to_string().contains("query"));
    }

    #[test]
    fn test_unclosed_placeholder_is_error() {
        assert!(render_template("Search {query", &Arguments::new()).is_err());
    }
}
