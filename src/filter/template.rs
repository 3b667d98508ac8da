//! Operand template expansion

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Row values a template is expanded against
pub type Row = Map<String, Value>;

/// Renders operand templates against row values
pub trait TemplateEngine {
    fn render(&self, template: &str, row: &Row) -> String;
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{?\s*([^{}\s]+)\s*\}?\}\}").expect("placeholder pattern is valid")
});

/// `{{column}}` / `{{{column}}}` substitution
///
/// Missing and null values render as the empty string, strings render raw,
/// everything else renders as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceTemplate;

impl TemplateEngine for BraceTemplate {
    fn render(&self, template: &str, row: &Row) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &regex::Captures<'_>| {
                match row.get(&caps[1]) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_substitutes_both_brace_forms() {
        let row = row(json!({"id": 12, "name": "abc"}));
        assert_eq!(BraceTemplate.render("{{id}}-{{{name}}}", &row), "12-abc");
    }

    #[test]
    fn test_missing_and_null_render_empty() {
        let row = row(json!({"id": null}));
        assert_eq!(BraceTemplate.render("{{id}}{{other}}", &row), "");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(BraceTemplate.render("plain", &Row::new()), "plain");
    }
}
