//! Gateway Aggregator (spec §4.5): fans `tools/list` out to every enabled
//! upstream concurrently, namespaces the results, tracks per-upstream
//! health, and publishes a [`GatewaySnapshot`] atomically via
//! [`arc_swap::ArcSwap`] — the same discipline as `sa-catalog`'s
//! `SnapshotProvider` (spec §4.4).

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use chrono::Utc;
use glob::Pattern;
use sa_domain::config::GatewayConfig;
use sa_domain::gateway::{GatewaySnapshot, GatewayUpstream, NamespacedTool, UpstreamStatus};

use crate::http;

/// Holds and refreshes the aggregated [`GatewaySnapshot`] (spec §4.5).
pub struct GatewayAggregator {
    client: reqwest::Client,
    config: ArcSwap<GatewayConfig>,
    current: ArcSwap<GatewaySnapshot>,
    last_build_utc_ms: AtomicI64,
}

impl GatewayAggregator {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: ArcSwap::from_pointee(config),
            current: ArcSwap::from_pointee(GatewaySnapshot::empty()),
            last_build_utc_ms: AtomicI64::new(0),
        }
    }

    /// Wait-free: returns the current snapshot.
    pub fn get_snapshot(&self) -> Arc<GatewaySnapshot> {
        self.current.load_full()
    }

    pub fn config(&self) -> Arc<GatewayConfig> {
        self.config.load_full()
    }

    pub fn update_config(&self, config: GatewayConfig) {
        self.config.store(Arc::new(config));
    }

    /// Concurrently polls every enabled upstream, composes a global
    /// snapshot, and publishes it atomically (spec §4.5 algorithm).
    pub async fn build_snapshot(&self) -> Arc<GatewaySnapshot> {
        let config = self.config.load_full();

        let polls = config
            .upstreams
            .iter()
            .filter(|u| u.enabled)
            .map(|upstream| self.poll_upstream(upstream));
        let results: Vec<(UpstreamStatus, Vec<NamespacedTool>)> =
            futures_util::future::join_all(polls).await;

        // Upstreams present in config but disabled still get no status
        // entry omitted deliberately — only *enabled* upstreams are
        // health-checked; disabled ones are simply absent from aggregation.
        let mut upstream_status = HashMap::new();
        let mut candidate_tools: Vec<NamespacedTool> = Vec::new();
        for (status, tools) in results {
            upstream_status.insert(status.upstream_name.clone(), status);
            candidate_tools.extend(tools);
        }

        let allowed: Vec<Pattern> = compile_patterns(&config.allowed_tool_patterns);
        let denied: Vec<Pattern> = compile_patterns(&config.denied_tool_patterns);

        let mut tools_by_name = HashMap::new();
        for tool in candidate_tools {
            if !tool_name_allowed(
                &tool.namespaced_name,
                &allowed,
                &denied,
                config.deny_by_default,
            ) {
                continue;
            }
            tools_by_name.insert(tool.namespaced_name.clone(), tool);
        }

        let snapshot = Arc::new(GatewaySnapshot {
            created_utc: Utc::now(),
            tools_by_name,
            upstream_status,
        });

        self.current.store(snapshot.clone());
        self.last_build_utc_ms
            .store(now_ms(), Ordering::SeqCst);
        snapshot
    }

    /// Throttled refresh (spec §4.5 "Throttling", same discipline as §4.4):
    /// skip if within `catalog_refresh_interval_ms` of the last build.
    pub async fn ensure_fresh(&self) -> Arc<GatewaySnapshot> {
        let interval = self.config.load().catalog_refresh_interval_ms;
        let elapsed = now_ms() - self.last_build_utc_ms.load(Ordering::SeqCst);
        if elapsed >= 0 && (elapsed as u64) < interval {
            return self.get_snapshot();
        }
        self.build_snapshot().await
    }

    async fn poll_upstream(&self, upstream: &GatewayUpstream) -> (UpstreamStatus, Vec<NamespacedTool>) {
        let started = Instant::now();
        let timeout = Duration::from_millis(upstream.request_timeout_ms);
        let result = http::tools_list(
            &self.client,
            &upstream.mcp_http_endpoint,
            timeout,
            &upstream.default_headers,
        )
        .await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(value) => match parse_tools(&value) {
                Ok(tools) => {
                    let separator = self.config.load().tool_name_separator.clone();
                    let namespaced: Vec<NamespacedTool> = tools
                        .into_iter()
                        .map(|t| NamespacedTool {
                            namespaced_name: format!(
                                "{}{}{}",
                                upstream.namespace_prefix, separator, t.name
                            ),
                            upstream_name: upstream.upstream_name.clone(),
                            upstream_tool_name: t.name,
                            description: t.description,
                            input_schema: t.input_schema,
                        })
                        .collect();
                    (
                        UpstreamStatus {
                            upstream_name: upstream.upstream_name.clone(),
                            healthy: true,
                            last_check_utc: Utc::now(),
                            last_error: None,
                            latency_ms: Some(latency_ms),
                            tool_count: Some(namespaced.len()),
                        },
                        namespaced,
                    )
                }
                Err(e) => (
                    UpstreamStatus {
                        upstream_name: upstream.upstream_name.clone(),
                        healthy: false,
                        last_check_utc: Utc::now(),
                        last_error: Some(e),
                        latency_ms: Some(latency_ms),
                        tool_count: None,
                    },
                    Vec::new(),
                ),
            },
            Err(e) => (
                UpstreamStatus {
                    upstream_name: upstream.upstream_name.clone(),
                    healthy: false,
                    last_check_utc: Utc::now(),
                    last_error: Some(e.to_string()),
                    latency_ms: Some(latency_ms),
                    tool_count: None,
                },
                Vec::new(),
            ),
        }
    }
}

struct RawTool {
    name: String,
    description: Option<String>,
    input_schema: Option<serde_json::Value>,
}

fn parse_tools(value: &serde_json::Value) -> Result<Vec<RawTool>, String> {
    let tools = value
        .get("tools")
        .and_then(|t| t.as_array())
        .ok_or_else(|| "tools/list result missing 'tools' array".to_string())?;

    let mut out = Vec::with_capacity(tools.len());
    for tool in tools {
        let name = tool
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| "tool entry missing 'name'".to_string())?
            .to_string();
        let description = tool
            .get("description")
            .and_then(|d| d.as_str())
            .map(String::from);
        let input_schema = tool.get("inputSchema").cloned();
        out.push(RawTool {
            name,
            description,
            input_schema,
        });
    }
    Ok(out)
}

fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
}

/// Denied patterns beat allowed; if `deny_by_default` and `allowed` is
/// empty, the effect is to deny all (spec §4.5).
fn tool_name_allowed(name: &str, allowed: &[Pattern], denied: &[Pattern], deny_by_default: bool) -> bool {
    if denied.iter().any(|p| p.matches(name)) {
        return false;
    }
    if !allowed.is_empty() {
        return allowed.iter().any(|p| p.matches(name));
    }
    !deny_by_default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_beats_allowed() {
        let allowed = compile_patterns(&["weather.*".into()]);
        let denied = compile_patterns(&["weather.secret_*".into()]);
        assert!(!tool_name_allowed(
            "weather.secret_forecast",
            &allowed,
            &denied,
            false
        ));
        assert!(tool_name_allowed(
            "weather.current",
            &allowed,
            &denied,
            false
        ));
    }

    #[test]
    fn empty_allowed_with_deny_by_default_denies_all() {
        assert!(!tool_name_allowed("anything", &[], &[], true));
    }

    #[test]
    fn empty_allowed_without_deny_by_default_allows_all() {
        assert!(tool_name_allowed("anything", &[], &[], false));
    }

    #[tokio::test]
    async fn build_snapshot_with_no_upstreams_is_empty_but_valid() {
        let aggregator = GatewayAggregator::new(GatewayConfig::default());
        let snapshot = aggregator.build_snapshot().await;
        assert!(snapshot.tools_by_name.is_empty());
        assert!(snapshot.validate().is_ok());
    }
}
