//! Policy resolver (spec §4.1): deterministic precedence engine —
//! blacklist > whitelist > default — matching endpoints by operation-id,
//! route+method, or display-name.

use sa_domain::endpoint::EndpointDescriptor;
use sa_domain::error::{Error, Result};
use sa_domain::policy::{EndpointPolicy, PolicyConfig, PolicySource, ResolutionResult};

use crate::engine::{Rule, RuleContext};

/// Shared context for the three match rules below (spec §4.2 "Policy
/// matching").
struct MatchContext<'a> {
    endpoint: &'a EndpointDescriptor,
    candidate: &'a EndpointPolicy,
    matched: bool,
}

impl RuleContext for MatchContext<'_> {
    fn is_settled(&self) -> bool {
        self.matched
    }
}

fn methods_compatible(policy_method: &Option<String>, endpoint_method: &str) -> bool {
    match policy_method {
        None => true,
        Some(m) => m.eq_ignore_ascii_case(endpoint_method),
    }
}

/// Highest precedence: `operationId` equality (case-sensitive), filtered by
/// `httpMethod` when both sides specify it.
struct ByOperationId;
impl Rule<MatchContext<'_>> for ByOperationId {
    fn priority(&self) -> i32 {
        0
    }
    fn should_apply(&self, ctx: &MatchContext<'_>) -> bool {
        ctx.candidate.operation_id.is_some() && ctx.endpoint.operation_id.is_some()
    }
    fn execute(&self, ctx: &mut MatchContext<'_>) {
        if ctx.candidate.operation_id.as_deref() == ctx.endpoint.operation_id.as_deref()
            && methods_compatible(&ctx.candidate.http_method, &ctx.endpoint.http_method)
        {
            ctx.matched = true;
        }
    }
}

/// Second precedence: `routeTemplate` equality, filtered by `httpMethod`.
struct ByRouteTemplate;
impl Rule<MatchContext<'_>> for ByRouteTemplate {
    fn priority(&self) -> i32 {
        10
    }
    fn should_apply(&self, ctx: &MatchContext<'_>) -> bool {
        ctx.candidate.route_template.is_some()
    }
    fn execute(&self, ctx: &mut MatchContext<'_>) {
        if ctx.candidate.route_template.as_deref() == Some(ctx.endpoint.route_template.as_str())
            && methods_compatible(&ctx.candidate.http_method, &ctx.endpoint.http_method)
        {
            ctx.matched = true;
        }
    }
}

/// Lowest precedence: `displayName` equality, filtered by `httpMethod`.
struct ByDisplayName;
impl Rule<MatchContext<'_>> for ByDisplayName {
    fn priority(&self) -> i32 {
        20
    }
    fn should_apply(&self, ctx: &MatchContext<'_>) -> bool {
        ctx.candidate.display_name.is_some() && ctx.endpoint.display_name.is_some()
    }
    fn execute(&self, ctx: &mut MatchContext<'_>) {
        if ctx.candidate.display_name.as_deref() == ctx.endpoint.display_name.as_deref()
            && methods_compatible(&ctx.candidate.http_method, &ctx.endpoint.http_method)
        {
            ctx.matched = true;
        }
    }
}

/// Whether `candidate` matches `endpoint`, per the three ordered rules
/// (spec §4.1 "Matching rules").
pub fn matches(candidate: &EndpointPolicy, endpoint: &EndpointDescriptor) -> bool {
    let mut ctx = MatchContext {
        endpoint,
        candidate,
        matched: false,
    };
    let rules: Vec<Box<dyn Rule<MatchContext<'_>>>> = vec![
        Box::new(ByOperationId),
        Box::new(ByRouteTemplate),
        Box::new(ByDisplayName),
    ];
    crate::engine::run(&rules, &mut ctx);
    ctx.matched
}

/// Resolves the effective policy for `endpoint` against `config`
/// (spec §4.1 algorithm).
///
/// Returns `InvalidArgument` when the descriptor has no match keys; the
/// resolver itself never fails on matching.
pub fn resolve(endpoint: &EndpointDescriptor, config: &PolicyConfig) -> Result<ResolutionResult> {
    endpoint.validate()?;

    // A blacklist match disables regardless of its own `enabled` flag.
    if config.blacklist.iter().any(|p| matches(p, endpoint)) {
        return Ok(ResolutionResult::disabled(PolicySource::Blacklist));
    }

    if let Some(entry) = config.whitelist.iter().find(|p| matches(p, endpoint)) {
        return Ok(if entry.enabled {
            ResolutionResult::enabled_from(PolicySource::Whitelist, entry)
        } else {
            ResolutionResult::disabled(PolicySource::Whitelist)
        });
    }

    Ok(if config.deny_by_default {
        ResolutionResult::disabled(PolicySource::Default)
    } else {
        ResolutionResult::enabled_default()
    })
}

/// Null/invalid-descriptor guard used by callers that build an
/// `EndpointDescriptor` from untrusted input before calling [`resolve`].
pub fn validate_policy_config(config: &PolicyConfig) -> Result<()> {
    for entry in config.whitelist.iter().chain(config.blacklist.iter()) {
        entry.validate().map_err(|e| {
            Error::Configuration(format!("invalid policy entry: {e}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_domain::policy::AuthPropagationMode;

    fn endpoint(op: Option<&str>, route: &str, method: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            route_template: route.into(),
            http_method: method.into(),
            operation_id: op.map(String::from),
            display_name: None,
            consumes: vec![],
            produces: vec![],
            requires_auth: false,
        }
    }

    fn policy(
        op: Option<&str>,
        route: Option<&str>,
        method: Option<&str>,
        enabled: bool,
    ) -> EndpointPolicy {
        EndpointPolicy {
            operation_id: op.map(String::from),
            route_template: route.map(String::from),
            http_method: method.map(String::from),
            enabled,
            ..Default::default()
        }
    }

    #[test]
    fn blacklist_wins_over_whitelist() {
        let e = endpoint(None, "/api/tools/{id}", "DELETE");
        let cfg = PolicyConfig {
            deny_by_default: false,
            whitelist: vec![policy(None, Some("/api/tools/{id}"), Some("DELETE"), true)],
            blacklist: vec![policy(None, Some("/api/tools/{id}"), Some("DELETE"), true)],
            ..Default::default()
        };
        let result = resolve(&e, &cfg).unwrap();
        assert!(!result.enabled);
        assert_eq!(result.source, PolicySource::Blacklist);
    }

    #[test]
    fn whitelist_propagates_its_enabled_flag() {
        let e = endpoint(Some("getThing"), "/api/thing", "GET");
        let cfg = PolicyConfig {
            whitelist: vec![policy(Some("getThing"), None, None, false)],
            ..Default::default()
        };
        let result = resolve(&e, &cfg).unwrap();
        assert!(!result.enabled);
        assert_eq!(result.source, PolicySource::Whitelist);
    }

    #[test]
    fn unmatched_uses_deny_by_default() {
        let e = endpoint(Some("other"), "/x", "GET");
        let cfg = PolicyConfig {
            deny_by_default: true,
            ..Default::default()
        };
        let result = resolve(&e, &cfg).unwrap();
        assert!(!result.enabled);
        assert_eq!(result.source, PolicySource::Default);
    }

    #[test]
    fn unmatched_allows_when_not_deny_by_default() {
        let e = endpoint(Some("other"), "/x", "GET");
        let cfg = PolicyConfig::default();
        let result = resolve(&e, &cfg).unwrap();
        assert!(result.enabled);
        assert_eq!(result.source, PolicySource::Default);
    }

    #[test]
    fn operation_id_match_takes_precedence_over_route() {
        let e = endpoint(Some("getThing"), "/api/thing", "GET");
        let cfg = PolicyConfig {
            whitelist: vec![
                policy(Some("getThing"), None, None, true),
                policy(None, Some("/api/thing"), Some("GET"), false),
            ],
            ..Default::default()
        };
        // Both would match; operationId (first in list, and by rule
        // priority) decides regardless of scan order since each candidate
        // is matched independently and the first list-order match wins
        // per spec; here the first entry is already the op-id match.
        let result = resolve(&e, &cfg).unwrap();
        assert!(result.enabled);
    }

    #[test]
    fn method_mismatch_does_not_match() {
        let e = endpoint(None, "/api/thing", "GET");
        let p = policy(None, Some("/api/thing"), Some("POST"), true);
        assert!(!matches(&p, &e));
    }

    #[test]
    fn invalid_descriptor_is_rejected() {
        let e = EndpointDescriptor {
            route_template: String::new(),
            http_method: "GET".into(),
            operation_id: None,
            display_name: None,
            consumes: vec![],
            produces: vec![],
            requires_auth: false,
        };
        let cfg = PolicyConfig::default();
        assert!(resolve(&e, &cfg).is_err());
    }

    #[test]
    fn auth_propagation_mode_round_trips() {
        let mut p = policy(Some("x"), None, None, true);
        p.auth_propagation_mode = AuthPropagationMode::BearerToken;
        let e = endpoint(Some("x"), "/x", "GET");
        let cfg = PolicyConfig {
            whitelist: vec![p],
            ..Default::default()
        };
        let result = resolve(&e, &cfg).unwrap();
        assert_eq!(result.auth_propagation_mode, AuthPropagationMode::BearerToken);
    }
}
