use serde::{Deserialize, Serialize};

use crate::gateway::GatewayUpstream;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Gateway aggregation (spec §6 "Gateway config")
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "d_separator")]
    pub tool_name_separator: String,
    #[serde(default)]
    pub deny_by_default: bool,
    #[serde(default)]
    pub allowed_tool_patterns: Vec<String>,
    #[serde(default)]
    pub denied_tool_patterns: Vec<String>,
    #[serde(default = "d_refresh_interval_ms")]
    pub catalog_refresh_interval_ms: u64,
    #[serde(default = "d_min_reload_interval_ms")]
    pub min_reload_interval_ms: u64,
    #[serde(default)]
    pub upstreams: Vec<GatewayUpstream>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            tool_name_separator: d_separator(),
            deny_by_default: false,
            allowed_tool_patterns: Vec::new(),
            denied_tool_patterns: Vec::new(),
            catalog_refresh_interval_ms: d_refresh_interval_ms(),
            min_reload_interval_ms: d_min_reload_interval_ms(),
            upstreams: Vec::new(),
        }
    }
}

fn d_separator() -> String {
    ".".into()
}
fn d_refresh_interval_ms() -> u64 {
    5 * 60 * 1000
}
fn d_min_reload_interval_ms() -> u64 {
    1000
}

/// Recommended band for `catalog_refresh_interval_ms` (spec §4.5): values
/// outside `30s..=1h` emit a validation warning, not an error.
pub const REFRESH_INTERVAL_RECOMMENDED_MIN_MS: u64 = 30_000;
pub const REFRESH_INTERVAL_RECOMMENDED_MAX_MS: u64 = 3_600_000;

/// Validates a single glob pattern per spec §6: only a bare `*` wildcard is
/// permitted; `**`, `?`, `[`, `]` are invalid.
pub fn validate_glob_pattern(pattern: &str) -> bool {
    if pattern.contains("**") {
        return false;
    }
    !pattern.contains(['?', '[', ']'])
}
