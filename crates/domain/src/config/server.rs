use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_port")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Diagnostics path (spec §6 `GET /<diagnostics-path>`).
    #[serde(default = "d_diagnostics_path")]
    pub diagnostics_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_port(),
            host: d_host(),
            cors: CorsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            diagnostics_path: d_diagnostics_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed for CORS. Use `["*"]` for permissive (NOT recommended).
    #[serde(default = "d_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_cors_origins(),
        }
    }
}

/// Per-IP request-rate limiting applied at the HTTP layer via
/// `tower_governor`. Distinct from the per-tool [`crate::policy::RateLimitPolicy`]
/// in the policy data model, which is enforced by the executor per tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_burst_size")]
    pub burst_size: u32,
    #[serde(default = "d_per_second")]
    pub per_second: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: d_true(),
            burst_size: d_burst_size(),
            per_second: d_per_second(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_port() -> u16 {
    8787
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_cors_origins() -> Vec<String> {
    vec!["http://localhost:*".into(), "http://127.0.0.1:*".into()]
}
fn d_true() -> bool {
    true
}
fn d_burst_size() -> u32 {
    20
}
fn d_per_second() -> u64 {
    10
}
fn d_diagnostics_path() -> String {
    "diagnostics".into()
}
