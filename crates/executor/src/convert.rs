//! Value converters for URI building (spec §4.6 "Value converters").
//!
//! Arguments arrive as [`serde_json::Value`]; JSON already carries dates and
//! UUIDs as strings, so the ISO-8601/canonical-form requirement is satisfied
//! by the caller at the JSON boundary. This module's job is the remaining
//! cases: booleans lowercased, numbers by their natural representation,
//! and a string fallback for anything else.

use serde_json::Value;

/// Renders a single argument value the way it should appear substituted
/// into a URI template or as a query parameter value (pre percent-encoding).
pub fn value_to_uri_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_lowercase() {
        assert_eq!(value_to_uri_string(&Value::Bool(true)), "true");
        assert_eq!(value_to_uri_string(&Value::Bool(false)), "false");
    }

    #[test]
    fn strings_pass_through_unquoted() {
        assert_eq!(
            value_to_uri_string(&Value::String("2024-01-01T00:00:00Z".into())),
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(value_to_uri_string(&serde_json::json!(42)), "42");
    }
}
