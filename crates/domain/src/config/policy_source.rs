use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Policy config source (spec §1 `PolicyConfigProvider` is out of scope as a
// concrete implementation; this is the interface's config knob)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicySourceConfig {
    /// No external policy document; every endpoint resolves via
    /// `deny_by_default`.
    None,
    /// A JSON file on disk, re-read on every `reload()`.
    File { path: String },
}

impl Default for PolicySourceConfig {
    fn default() -> Self {
        Self::None
    }
}
