use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool executor (spec §4.6)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "d_default_timeout_ms")]
    pub default_timeout_ms: u64,
    #[serde(default = "d_max_content_length")]
    pub max_request_content_length_bytes: usize,
    /// Base URL used to resolve a local `EndpointDescriptor`'s
    /// `route_template` when the tool is backed by the hosting application
    /// rather than a remote upstream.
    #[serde(default)]
    pub local_base_url: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: d_default_timeout_ms(),
            max_request_content_length_bytes: d_max_content_length(),
            local_base_url: None,
        }
    }
}

fn d_default_timeout_ms() -> u64 {
    30_000
}
fn d_max_content_length() -> usize {
    1024 * 1024
}
