//! Redaction (spec §4.8): an optional filter over outbound JSON and text.
//!
//! Fast path: when disabled, input passes through unchanged. Field-name
//! redaction is case-insensitive and recursive through objects and arrays.
//! Pattern redaction applies a precompiled ordered list of regexes, lazily
//! compiled on first use.

use std::sync::OnceLock;

use regex::Regex;
use sa_domain::config::RedactionConfig;
use serde_json::Value;

pub const REDACTED: &str = "[REDACTED]";

pub struct Redactor {
    config: RedactionConfig,
    field_names_lower: Vec<String>,
    patterns: OnceLock<Vec<Regex>>,
}

impl Redactor {
    pub fn new(config: RedactionConfig) -> Self {
        let field_names_lower = config.field_names.iter().map(|s| s.to_lowercase()).collect();
        Self {
            config,
            field_names_lower,
            patterns: OnceLock::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Recursively redacts values of matching field names in a JSON value.
    /// Returns `value` unchanged when redaction is disabled.
    pub fn redact_json(&self, value: Value) -> Value {
        if !self.config.enabled {
            return value;
        }
        self.redact_json_inner(value)
    }

    fn redact_json_inner(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| {
                        if self.field_names_lower.contains(&k.to_lowercase()) {
                            (k, Value::String(REDACTED.to_string()))
                        } else {
                            (k, self.redact_json_inner(v))
                        }
                    })
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.redact_json_inner(v)).collect())
            }
            other => other,
        }
    }

    /// Applies the configured ordered regex patterns to free text. Returns
    /// `text` unchanged when disabled or when no patterns are configured.
    pub fn redact_text<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        if !self.config.enabled || self.config.text_patterns.is_empty() {
            return std::borrow::Cow::Borrowed(text);
        }
        let patterns = self.compiled_patterns();
        let mut out = std::borrow::Cow::Borrowed(text);
        for pattern in patterns {
            if pattern.is_match(&out) {
                out = std::borrow::Cow::Owned(pattern.replace_all(&out, REDACTED).into_owned());
            }
        }
        out
    }

    fn compiled_patterns(&self) -> &[Regex] {
        self.patterns.get_or_init(|| {
            self.config
                .text_patterns
                .iter()
                .filter_map(|p| match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!(pattern = %p, error = %e, "invalid redaction pattern, skipping");
                        None
                    }
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool) -> RedactionConfig {
        RedactionConfig {
            enabled,
            field_names: vec!["password".into(), "token".into()],
            text_patterns: vec![],
        }
    }

    #[test]
    fn disabled_is_fast_path_noop() {
        let redactor = Redactor::new(config(false));
        let input = serde_json::json!({"password": "hunter2"});
        assert_eq!(redactor.redact_json(input.clone()), input);
    }

    #[test]
    fn redacts_case_insensitive_field_recursively() {
        let redactor = Redactor::new(config(true));
        let input = serde_json::json!({
            "user": {"PASSWORD": "hunter2", "name": "alice"},
            "tokens": [{"token": "abc"}, {"token": "def"}],
        });
        let out = redactor.redact_json(input);
        assert_eq!(out["user"]["PASSWORD"], REDACTED);
        assert_eq!(out["user"]["name"], "alice");
        assert_eq!(out["tokens"][0]["token"], REDACTED);
        assert_eq!(out["tokens"][1]["token"], REDACTED);
    }

    #[test]
    fn text_pattern_redacts_matches() {
        let mut cfg = config(true);
        cfg.text_patterns = vec![r"\d{3}-\d{2}-\d{4}".to_string()];
        let redactor = Redactor::new(cfg);
        let out = redactor.redact_text("ssn is 123-45-6789 today");
        assert_eq!(out, "ssn is [REDACTED] today");
    }

    #[test]
    fn invalid_pattern_is_skipped_not_fatal() {
        let mut cfg = config(true);
        cfg.text_patterns = vec!["(unterminated".to_string()];
        let redactor = Redactor::new(cfg);
        assert_eq!(redactor.redact_text("hello"), "hello");
    }
}
