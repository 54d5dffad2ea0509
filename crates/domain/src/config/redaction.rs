use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Redaction (spec §4.8)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Field names (case-insensitive) whose values are replaced with
    /// `[REDACTED]` wherever they appear in outbound JSON.
    #[serde(default = "d_field_names")]
    pub field_names: Vec<String>,
    /// Ordered regular expressions applied to outbound text; compiled
    /// lazily on first use.
    #[serde(default)]
    pub text_patterns: Vec<String>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            field_names: d_field_names(),
            text_patterns: Vec::new(),
        }
    }
}

fn d_field_names() -> Vec<String> {
    vec![
        "password".into(),
        "token".into(),
        "secret".into(),
        "apikey".into(),
        "api_key".into(),
        "authorization".into(),
    ]
}
