mod catalog;
mod executor;
mod gateway;
mod policy_source;
mod redaction;
mod server;

pub use catalog::*;
pub use executor::*;
pub use gateway::*;
pub use policy_source::*;
pub use redaction::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::config::gateway::validate_glob_pattern;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
    #[serde(default)]
    pub policy_source: PolicySourceConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues. Returns an
    /// empty vec when everything looks good. Unlike `reload()`'s provider
    /// errors, these are caught before the server ever starts serving.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }
        if self.server.rate_limit.enabled && self.server.rate_limit.per_second == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.rate_limit.per_second".into(),
                message: "per_second must be > 0 when rate limiting is enabled".into(),
            });
        }

        // Gateway: duplicate upstream name / namespace prefix detection.
        let mut seen_names = HashSet::new();
        let mut seen_prefixes = HashSet::new();
        for upstream in &self.gateway.upstreams {
            if let Err(e) = upstream.validate() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "gateway.upstreams".into(),
                    message: e.to_string(),
                });
                continue;
            }
            if !seen_names.insert(upstream.upstream_name.clone()) {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "gateway.upstreams".into(),
                    message: format!("duplicate upstream_name '{}'", upstream.upstream_name),
                });
            }
            if !seen_prefixes.insert(upstream.namespace_prefix.clone()) {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "gateway.upstreams".into(),
                    message: format!(
                        "duplicate namespace_prefix '{}'",
                        upstream.namespace_prefix
                    ),
                });
            }
        }

        for pattern in self
            .gateway
            .allowed_tool_patterns
            .iter()
            .chain(self.gateway.denied_tool_patterns.iter())
        {
            if !validate_glob_pattern(pattern) {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "gateway.{allowed,denied}_tool_patterns".into(),
                    message: format!(
                        "pattern '{pattern}' is invalid: only a bare '*' wildcard is permitted"
                    ),
                });
            }
        }

        let refresh = self.gateway.catalog_refresh_interval_ms;
        if !(REFRESH_INTERVAL_RECOMMENDED_MIN_MS..=REFRESH_INTERVAL_RECOMMENDED_MAX_MS)
            .contains(&refresh)
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "gateway.catalog_refresh_interval_ms".into(),
                message: format!(
                    "{refresh}ms is outside the recommended 30s..1h band"
                ),
            });
        }

        if self.executor.default_timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "executor.default_timeout_ms".into(),
                message: "default_timeout_ms must be > 0".into(),
            });
        }

        for (i, endpoint) in self.catalog.endpoints.iter().enumerate() {
            if let Err(e) = endpoint.validate() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: format!("catalog.endpoints[{i}]"),
                    message: e.to_string(),
                });
            }
        }
        if self.catalog.min_reload_interval_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "catalog.min_reload_interval_ms".into(),
                message: "0 disables reload throttling entirely".into(),
            });
        }

        if let PolicySourceConfig::File { path } = &self.policy_source {
            if path.is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "policy_source.path".into(),
                    message: "path must not be empty".into(),
                });
            }
        }

        errors
    }

    pub fn has_errors(errors: &[ConfigError]) -> bool {
        errors.iter().any(|e| e.severity == ConfigSeverity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_validation_errors() {
        let cfg = Config::default();
        let errors = cfg.validate();
        assert!(!Config::has_errors(&errors), "unexpected errors: {errors:?}");
    }

    #[test]
    fn zero_port_is_an_error() {
        let mut cfg = Config::default();
        cfg.server.port = 0;
        let errors = cfg.validate();
        assert!(Config::has_errors(&errors));
    }

    #[test]
    fn duplicate_upstream_name_is_rejected() {
        use crate::gateway::GatewayUpstream;
        let mut cfg = Config::default();
        cfg.gateway.upstreams = vec![
            GatewayUpstream {
                upstream_name: "weather".into(),
                mcp_http_endpoint: "http://localhost:9001/mcp".into(),
                namespace_prefix: "weather".into(),
                enabled: true,
                request_timeout_ms: 5000,
                default_headers: Default::default(),
            },
            GatewayUpstream {
                upstream_name: "weather".into(),
                mcp_http_endpoint: "http://localhost:9002/mcp".into(),
                namespace_prefix: "weather2".into(),
                enabled: true,
                request_timeout_ms: 5000,
                default_headers: Default::default(),
            },
        ];
        let errors = cfg.validate();
        assert!(Config::has_errors(&errors));
    }

    #[test]
    fn invalid_glob_pattern_is_rejected() {
        let mut cfg = Config::default();
        cfg.gateway.allowed_tool_patterns = vec!["foo/**".into()];
        let errors = cfg.validate();
        assert!(Config::has_errors(&errors));
    }

    #[test]
    fn refresh_interval_outside_band_warns_but_not_errors() {
        let mut cfg = Config::default();
        cfg.gateway.catalog_refresh_interval_ms = 5_000;
        let errors = cfg.validate();
        assert!(!Config::has_errors(&errors));
        assert!(errors
            .iter()
            .any(|e| e.severity == ConfigSeverity::Warning));
    }

    #[test]
    fn invalid_catalog_endpoint_is_rejected() {
        use crate::endpoint::EndpointDescriptor;
        let mut cfg = Config::default();
        cfg.catalog.endpoints = vec![EndpointDescriptor {
            route_template: String::new(),
            http_method: "GET".into(),
            operation_id: None,
            display_name: None,
            consumes: vec![],
            produces: vec![],
            requires_auth: false,
        }];
        let errors = cfg.validate();
        assert!(Config::has_errors(&errors));
    }

    #[test]
    fn toml_round_trip() {
        let cfg = Config::default();
        let s = toml::to_string(&cfg).expect("serialize");
        let back: Config = toml::from_str(&s).expect("deserialize");
        assert_eq!(back.server.port, cfg.server.port);
    }
}
