//! Free-form generation input. Missing, blank or non-text values never fail;
//! they are replaced by a default phrase at the point of use.

use serde_json::{Map, Value};

/// The two context fields that feed generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationContext {
    pub primary_goal: Option<String>,
    pub success_definition: Option<String>,
}

impl GenerationContext {
    /// Reads the fields from a loose JSON object. Strings are taken as-is,
    /// numbers and booleans are rendered as text, anything else is missing.
    pub fn from_json(context: &Map<String, Value>) -> Self {
        Self {
            primary_goal: text_field(context, "primary_goal"),
            success_definition: text_field(context, "success_definition"),
        }
    }
}

fn text_field(context: &Map<String, Value>, key: &str) -> Option<String> {
    match context.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Trimmed text, or `default` when the value is missing or blank.
pub fn normalize_text(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => default.to_string(),
    }
}
