//! Gateway aggregation data model (spec §3 `GatewayUpstream`, `GatewaySnapshot`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::endpoint::ToolDescriptor;

/// A remote MCP server aggregated behind the gateway (spec §3 `GatewayUpstream`).
///
/// Invariant: `upstream_name` is unique among configured upstreams;
/// `namespace_prefix` matches `[A-Za-z0-9._-]+` and is also unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayUpstream {
    pub upstream_name: String,
    pub mcp_http_endpoint: String,
    pub namespace_prefix: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub default_headers: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl GatewayUpstream {
    /// `requestTimeout` must be strictly positive; `namespacePrefix` must be
    /// non-empty and use only the allowed charset (spec §3, §6).
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.upstream_name.is_empty() {
            return Err(crate::error::Error::Configuration(
                "upstream_name must not be empty".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(crate::error::Error::Configuration(format!(
                "upstream '{}': request_timeout_ms must be > 0",
                self.upstream_name
            )));
        }
        if self.namespace_prefix.is_empty()
            || !self
                .namespace_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(crate::error::Error::Configuration(format!(
                "upstream '{}': namespace_prefix must be non-empty and match [A-Za-z0-9._-]+",
                self.upstream_name
            )));
        }
        if !(self.mcp_http_endpoint.starts_with("http://")
            || self.mcp_http_endpoint.starts_with("https://"))
        {
            return Err(crate::error::Error::Configuration(format!(
                "upstream '{}': mcp_http_endpoint must be an absolute http(s) URL",
                self.upstream_name
            )));
        }
        Ok(())
    }
}

/// Per-upstream health as observed by the last aggregation pass
/// (spec §3 `GatewaySnapshot` status record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamStatus {
    pub upstream_name: String,
    pub healthy: bool,
    pub last_check_utc: DateTime<Utc>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub tool_count: Option<usize>,
}

/// Aggregated view across all configured upstreams (spec §3 `GatewaySnapshot`).
///
/// Invariants: tool names are globally unique after namespacing; an
/// unhealthy upstream contributes zero tools but still has a status entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySnapshot {
    pub created_utc: DateTime<Utc>,
    pub tools_by_name: HashMap<String, NamespacedTool>,
    pub upstream_status: HashMap<String, UpstreamStatus>,
}

/// A tool discovered on an upstream, carrying enough to route a `tools/call`
/// back to its origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespacedTool {
    pub namespaced_name: String,
    pub upstream_name: String,
    pub upstream_tool_name: String,
    pub description: Option<String>,
    pub input_schema: Option<serde_json::Value>,
}

impl GatewaySnapshot {
    pub fn empty() -> Self {
        Self {
            created_utc: Utc::now(),
            tools_by_name: HashMap::new(),
            upstream_status: HashMap::new(),
        }
    }

    pub fn healthy_upstream_count(&self) -> usize {
        self.upstream_status.values().filter(|s| s.healthy).count()
    }

    /// Every entry's own descriptor-grade invariant, matching
    /// [`crate::endpoint::ToolCatalogSnapshot::validate`]'s spirit.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (key, tool) in &self.tools_by_name {
            if key != &tool.namespaced_name {
                return Err(crate::error::Error::Internal(format!(
                    "gateway snapshot key '{key}' does not match namespaced_name '{}'",
                    tool.namespaced_name
                )));
            }
        }
        Ok(())
    }
}

/// Placeholder carried alongside [`ToolDescriptor`] when a tool is backed by
/// the gateway's own local endpoint catalog rather than a remote upstream;
/// used by the JSON-RPC dispatcher to pick the right execution path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolOrigin {
    Local(ToolDescriptor),
    Upstream(NamespacedTool),
}
