//! Catalog Compiler (spec §4.3): endpoints + OpenAPI enrichment + policy →
//! immutable tool snapshot + gap report.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sa_domain::endpoint::{
    EndpointDescriptor, GapKind, MappingGapReport, OpenApiEnrichment, ToolCatalogSnapshot,
    ToolDescriptor,
};
use sa_domain::error::Result;
use sa_domain::policy::PolicyConfig;
use sa_rules::engine::{Rule, RuleContext};

use crate::name::{duplicate_suffix, generate_stable};

/// Per-endpoint admission context threaded through the admission rule
/// pipeline (spec §4.2 "Catalog admission").
struct AdmissionContext<'a> {
    endpoint: &'a EndpointDescriptor,
    enabled: bool,
    candidate_name: String,
    /// Whether `candidate_name` came from an explicit policy override
    /// (`toolName`) rather than stable derivation — only override
    /// collisions are skipped outright; derived-name collisions are
    /// disambiguated with a hash suffix instead (spec §4.3, §8 S4).
    name_is_override: bool,
    skip_reason: Option<GapKind>,
    settled: bool,
}

impl RuleContext for AdmissionContext<'_> {
    fn is_settled(&self) -> bool {
        self.settled
    }
}

struct EnabledPolicyValidation;
impl Rule<AdmissionContext<'_>> for EnabledPolicyValidation {
    fn priority(&self) -> i32 {
        0
    }
    fn should_apply(&self, _ctx: &AdmissionContext<'_>) -> bool {
        true
    }
    fn execute(&self, ctx: &mut AdmissionContext<'_>) {
        if !ctx.enabled {
            ctx.skip_reason = Some(GapKind::Disabled);
            ctx.settled = true;
        }
    }
}

struct ToolNameValidation;
impl Rule<AdmissionContext<'_>> for ToolNameValidation {
    fn priority(&self) -> i32 {
        10
    }
    fn should_apply(&self, _ctx: &AdmissionContext<'_>) -> bool {
        true
    }
    fn execute(&self, ctx: &mut AdmissionContext<'_>) {
        if ctx.candidate_name.is_empty() {
            ctx.skip_reason = Some(GapKind::NoToolName);
            ctx.settled = true;
        }
    }
}

/// Only applied when the candidate name was an explicit policy override;
/// collisions on stable-derived names are handled after the pipeline by
/// appending a hash suffix (they never reach "settled" here).
struct DuplicateDetection<'a> {
    existing_names: &'a HashSet<String>,
}
impl Rule<AdmissionContext<'_>> for DuplicateDetection<'_> {
    fn priority(&self) -> i32 {
        20
    }
    fn should_apply(&self, ctx: &AdmissionContext<'_>) -> bool {
        ctx.name_is_override
    }
    fn execute(&self, ctx: &mut AdmissionContext<'_>) {
        if self.existing_names.contains(&ctx.candidate_name) {
            ctx.skip_reason = Some(GapKind::DuplicateName);
            ctx.settled = true;
        }
    }
}

fn admission_rules<'a>(existing_names: &'a HashSet<String>) -> Vec<Box<dyn Rule<AdmissionContext<'a>> + 'a>> {
    vec![
        Box::new(EnabledPolicyValidation),
        Box::new(ToolNameValidation),
        Box::new(DuplicateDetection { existing_names }),
    ]
}

fn description_for(
    endpoint: &EndpointDescriptor,
    override_desc: Option<&str>,
    enrichment: Option<&OpenApiEnrichment>,
) -> String {
    if let Some(d) = override_desc {
        if !d.is_empty() {
            return d.to_string();
        }
    }
    if let Some(d) = enrichment.and_then(|e| e.description.as_deref()) {
        if !d.is_empty() {
            return d.to_string();
        }
    }
    format!(
        "Execute {} request on {}",
        endpoint.http_method.to_uppercase(),
        endpoint.route_template
    )
}

/// Compiles `endpoints` against `policy` (and optional OpenAPI
/// `enrichment`, keyed by `operationId`) into a
/// `(ToolCatalogSnapshot, MappingGapReport)` pair (spec §4.3).
pub fn compile(
    endpoints: &[EndpointDescriptor],
    enrichment: &HashMap<String, OpenApiEnrichment>,
    policy: &PolicyConfig,
) -> Result<(ToolCatalogSnapshot, MappingGapReport)> {
    sa_rules::policy::validate_policy_config(policy)?;

    let mut tools_by_name: HashMap<String, ToolDescriptor> = HashMap::new();
    let mut gap = MappingGapReport::default();
    let mut existing_names: HashSet<String> = HashSet::new();

    for endpoint in endpoints {
        let resolution = match sa_rules::policy::resolve(endpoint, policy) {
            Ok(r) => r,
            Err(e) => {
                gap.push(
                    GapKind::UnmatchedEndpoint,
                    format!(
                        "endpoint {} {} could not be resolved: {e}",
                        endpoint.http_method, endpoint.route_template
                    ),
                );
                continue;
            }
        };

        let op_enrichment = endpoint.operation_id.as_deref().and_then(|id| enrichment.get(id));

        let (candidate_name, name_is_override) = match resolution.tool_name_override.as_deref() {
            Some(n) if !n.is_empty() => (n.to_string(), true),
            _ => (
                generate_stable(&endpoint.http_method, &endpoint.route_template),
                false,
            ),
        };

        let mut ctx = AdmissionContext {
            endpoint,
            enabled: resolution.enabled,
            candidate_name: candidate_name.clone(),
            name_is_override,
            skip_reason: None,
            settled: false,
        };
        let rules = admission_rules(&existing_names);
        sa_rules::engine::run(&rules, &mut ctx);

        if let Some(reason) = ctx.skip_reason {
            gap.push(
                reason,
                format!(
                    "{} {} skipped ({:?})",
                    endpoint.http_method, endpoint.route_template, reason
                ),
            );
            continue;
        }

        // Stable-derived names that collide get a deterministic suffix
        // instead of being skipped (spec §4.3, §8 S4).
        let final_name = if existing_names.contains(&candidate_name) {
            let suffixed = format!(
                "{candidate_name}_{}",
                duplicate_suffix(&endpoint.http_method, &endpoint.route_template)
            );
            gap.push(
                GapKind::ToolNameCollision,
                format!(
                    "tool name collision on '{candidate_name}': disambiguated to '{suffixed}'"
                ),
            );
            suffixed
        } else {
            candidate_name
        };

        if endpoint.consumes_json() || endpoint.produces_json() {
            let missing_input = endpoint.consumes_json() && op_enrichment.and_then(|e| e.input_schema.as_ref()).is_none();
            let missing_response =
                endpoint.produces_json() && op_enrichment.and_then(|e| e.response_schema.as_ref()).is_none();
            if missing_input || missing_response {
                gap.push(
                    GapKind::MissingSchema,
                    format!(
                        "{} {} consumes/produces JSON but has no extracted schema",
                        endpoint.http_method, endpoint.route_template
                    ),
                );
            }
        }

        if endpoint.requires_auth
            && matches!(
                resolution.auth_propagation_mode,
                sa_domain::policy::AuthPropagationMode::Infer
            )
        {
            gap.push(
                GapKind::AuthInference,
                format!(
                    "{} {} requires auth and relies on inferred propagation",
                    endpoint.http_method, endpoint.route_template
                ),
            );
        }

        let description = description_for(
            endpoint,
            resolution.description_override.as_deref(),
            op_enrichment,
        );

        let descriptor = ToolDescriptor {
            tool_name: final_name.clone(),
            description,
            input_schema: op_enrichment.and_then(|e| e.input_schema.clone()),
            endpoint_descriptor: endpoint.clone(),
            effective_policy: resolution,
        };

        existing_names.insert(final_name.clone());
        tools_by_name.insert(final_name, descriptor);
    }

    let snapshot = ToolCatalogSnapshot {
        created_utc: Utc::now(),
        policy_source_version: policy.source_version.clone(),
        tools_by_name,
    };
    snapshot.validate()?;

    Ok((snapshot, gap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_domain::policy::{EndpointPolicy, PolicySource};

    fn ep(method: &str, route: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            route_template: route.into(),
            http_method: method.into(),
            operation_id: None,
            display_name: None,
            consumes: vec![],
            produces: vec![],
            requires_auth: false,
        }
    }

    #[test]
    fn duplicate_routes_get_one_plain_and_one_suffixed_name() {
        let endpoints = vec![ep("GET", "/api/foo"), ep("GET", "/api//foo/")];
        let (snapshot, gap) = compile(&endpoints, &HashMap::new(), &PolicyConfig::default()).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get("GET_api_foo").is_some());
        let suffixed = snapshot
            .tools_by_name
            .keys()
            .find(|k| k.starts_with("GET_api_foo_") && *k != "GET_api_foo")
            .expect("a suffixed duplicate should exist");
        assert!(snapshot.get(suffixed).is_some());
        assert!(gap
            .entries
            .iter()
            .any(|e| e.kind == GapKind::ToolNameCollision));
    }

    #[test]
    fn disabled_by_policy_is_skipped_with_reason() {
        let endpoints = vec![ep("DELETE", "/api/tools/{id}")];
        let cfg = PolicyConfig {
            blacklist: vec![EndpointPolicy {
                route_template: Some("/api/tools/{id}".into()),
                http_method: Some("DELETE".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let (snapshot, gap) = compile(&endpoints, &HashMap::new(), &cfg).unwrap();
        assert!(snapshot.is_empty());
        assert!(gap.entries.iter().any(|e| e.kind == GapKind::Disabled));
    }

    #[test]
    fn policy_override_name_collision_is_skipped_not_suffixed() {
        let endpoints = vec![ep("GET", "/api/a"), ep("GET", "/api/b")];
        let cfg = PolicyConfig {
            whitelist: vec![
                EndpointPolicy {
                    route_template: Some("/api/a".into()),
                    http_method: Some("GET".into()),
                    tool_name: Some("same_name".into()),
                    ..Default::default()
                },
                EndpointPolicy {
                    route_template: Some("/api/b".into()),
                    http_method: Some("GET".into()),
                    tool_name: Some("same_name".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let (snapshot, gap) = compile(&endpoints, &HashMap::new(), &cfg).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(gap.entries.iter().any(|e| e.kind == GapKind::DuplicateName));
    }

    #[test]
    fn effective_policy_source_is_attached() {
        let endpoints = vec![ep("GET", "/api/x")];
        let (snapshot, _gap) = compile(&endpoints, &HashMap::new(), &PolicyConfig::default()).unwrap();
        let tool = snapshot.get("GET_api_x").unwrap();
        assert_eq!(tool.effective_policy.source, PolicySource::Default);
    }
}
