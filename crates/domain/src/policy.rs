//! Policy data model (spec §3): immutable endpoint policies, rate limits,
//! and the policy config root consulted by the resolver.

use serde::{Deserialize, Serialize};

/// How (or whether) an authenticated caller's credentials are forwarded to
/// the upstream endpoint a tool wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AuthPropagationMode {
    /// Infer from the endpoint descriptor's `requiresAuth` flag.
    Infer,
    None,
    BearerToken,
    Cookies,
}

impl Default for AuthPropagationMode {
    fn default() -> Self {
        Self::Infer
    }
}

/// Rate-limit strategy and parameters (spec §3 `RateLimitPolicy`).
///
/// Invariant: when `strategy` is set, both `permit_limit > 0` and
/// `window_ms > 0` — enforced by [`RateLimitPolicy::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub strategy: RateLimitStrategy,
    #[serde(default)]
    pub permit_limit: u32,
    #[serde(default)]
    pub window_ms: u64,
    #[serde(default)]
    pub queue_limit: u32,
    #[serde(default)]
    pub tokens_per_period: u32,
    #[serde(default)]
    pub refill_period_ms: u64,
    #[serde(default)]
    pub penalty_ms: u64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub segmentation_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RateLimitStrategy {
    FixedWindow,
    SlidingWindow,
    TokenBucket,
    Concurrency,
}

impl RateLimitPolicy {
    /// `InvalidArgument` when the strategy is set but `permit_limit` or
    /// `window_ms` are not strictly positive (spec §3 invariant).
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.permit_limit == 0 || self.window_ms == 0 {
            return Err(crate::error::Error::InvalidArgument(
                "rate limit policy requires permit_limit > 0 and window_ms > 0".into(),
            ));
        }
        if self.penalty_ms == u64::MAX || self.queue_limit == u32::MAX {
            // unreachable in practice, guards against overflow-wrapped negatives
            return Err(crate::error::Error::InvalidArgument(
                "rate limit policy has an out-of-range field".into(),
            ));
        }
        Ok(())
    }
}

/// A single endpoint-matching policy entry (spec §3 `EndpointPolicy`).
///
/// Entries are immutable once constructed; `whitelist`/`blacklist` in
/// [`PolicyConfig`] are ordered `Vec<EndpointPolicy>` scanned front-to-back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointPolicy {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub route_template: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub concurrency_limit: Option<u32>,
    #[serde(default)]
    pub rate_limit_policy: Option<RateLimitPolicy>,
    #[serde(default)]
    pub auth_propagation_mode: AuthPropagationMode,
}

fn default_enabled() -> bool {
    true
}

impl EndpointPolicy {
    /// Numeric limits, if present, are strictly positive (spec §3 invariant).
    pub fn validate(&self) -> crate::error::Result<()> {
        if let Some(t) = self.timeout_ms {
            if t == 0 {
                return Err(crate::error::Error::InvalidArgument(
                    "timeout_ms must be > 0 when set".into(),
                ));
            }
        }
        if let Some(c) = self.concurrency_limit {
            if c == 0 {
                return Err(crate::error::Error::InvalidArgument(
                    "concurrency_limit must be > 0 when set".into(),
                ));
            }
        }
        if let Some(ref rl) = self.rate_limit_policy {
            rl.validate()?;
        }
        Ok(())
    }

    /// At least one match key must be present for this entry to ever match.
    pub fn has_match_key(&self) -> bool {
        self.operation_id.is_some() || self.route_template.is_some() || self.display_name.is_some()
    }
}

/// Policy config root (spec §3 `PolicyConfig`): the document fetched from a
/// [`crate::provider::PolicyConfigProvider`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub source_version: String,
    #[serde(default)]
    pub deny_by_default: bool,
    #[serde(default)]
    pub whitelist: Vec<EndpointPolicy>,
    #[serde(default)]
    pub blacklist: Vec<EndpointPolicy>,
}

fn default_schema_version() -> u32 {
    1
}

/// Where a resolved policy decision came from (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicySource {
    Blacklist,
    Whitelist,
    Default,
}

/// Output of [`crate::error::Result`]-returning policy resolution (spec §4.1 `ResolutionResult`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub enabled: bool,
    pub source: PolicySource,
    pub timeout_ms: Option<u64>,
    pub concurrency_limit: Option<u32>,
    pub auth_propagation_mode: AuthPropagationMode,
    pub rate_limit: Option<RateLimitPolicy>,
    /// The matched policy entry's overrides, if any (tool name / description).
    pub tool_name_override: Option<String>,
    pub description_override: Option<String>,
}

impl ResolutionResult {
    pub fn disabled(source: PolicySource) -> Self {
        Self {
            enabled: false,
            source,
            timeout_ms: None,
            concurrency_limit: None,
            auth_propagation_mode: AuthPropagationMode::Infer,
            rate_limit: None,
            tool_name_override: None,
            description_override: None,
        }
    }

    pub fn enabled_from(source: PolicySource, policy: &EndpointPolicy) -> Self {
        Self {
            enabled: true,
            source,
            timeout_ms: policy.timeout_ms,
            concurrency_limit: policy.concurrency_limit,
            auth_propagation_mode: policy.auth_propagation_mode,
            rate_limit: policy.rate_limit_policy.clone(),
            tool_name_override: policy.tool_name.clone(),
            description_override: policy.description.clone(),
        }
    }

    pub fn enabled_default() -> Self {
        Self {
            enabled: true,
            source: PolicySource::Default,
            timeout_ms: None,
            concurrency_limit: None,
            auth_propagation_mode: AuthPropagationMode::Infer,
            rate_limit: None,
            tool_name_override: None,
            description_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_requires_positive_permit_and_window() {
        let rl = RateLimitPolicy {
            strategy: RateLimitStrategy::FixedWindow,
            permit_limit: 0,
            window_ms: 1000,
            queue_limit: 0,
            tokens_per_period: 0,
            refill_period_ms: 0,
            penalty_ms: 0,
            scope: None,
            segmentation_key: None,
        };
        assert!(rl.validate().is_err());
    }

    #[test]
    fn endpoint_policy_rejects_zero_timeout() {
        let mut p = EndpointPolicy::default();
        p.timeout_ms = Some(0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn endpoint_policy_default_is_enabled_with_no_match_key() {
        let p = EndpointPolicy::default();
        assert!(p.enabled);
        assert!(!p.has_match_key());
    }
}
