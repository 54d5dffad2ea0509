//! Endpoint and tool descriptors (spec §3 `EndpointDescriptor`, `ToolDescriptor`,
//! `ToolCatalogSnapshot`) — the immutable entities shared by the catalog
//! compiler and the tool executor.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::policy::ResolutionResult;

/// A single HTTP operation eligible for catalog admission (spec §3).
///
/// Invariant: at least one of `operation_id`, `route_template`,
/// `display_name` is non-empty — enforced by [`EndpointDescriptor::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub route_template: String,
    pub http_method: String,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Media types this endpoint consumes. Optional; used only for gap
    /// reporting (spec §9 open question on `Consumes`/`Produces`).
    #[serde(default)]
    pub consumes: Vec<String>,
    /// Media types this endpoint produces. Optional; used only for gap
    /// reporting.
    #[serde(default)]
    pub produces: Vec<String>,
    #[serde(default)]
    pub requires_auth: bool,
}

impl EndpointDescriptor {
    pub fn validate(&self) -> crate::error::Result<()> {
        let has_key = self.operation_id.as_deref().is_some_and(|s| !s.is_empty())
            || !self.route_template.is_empty()
            || self.display_name.as_deref().is_some_and(|s| !s.is_empty());
        if !has_key {
            return Err(crate::error::Error::InvalidArgument(
                "endpoint descriptor has no match key (operationId, routeTemplate, displayName)"
                    .into(),
            ));
        }
        Ok(())
    }

    pub fn produces_json(&self) -> bool {
        self.produces.iter().any(|m| m.contains("json"))
    }

    pub fn consumes_json(&self) -> bool {
        self.consumes.iter().any(|m| m.contains("json"))
    }
}

/// OpenAPI-derived enrichment for a single `operationId` (spec §4.3 input).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiEnrichment {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Option<Value>,
    #[serde(default)]
    pub response_schema: Option<Value>,
}

/// A compiled, catalog-ready tool (spec §3 `ToolDescriptor`).
///
/// Invariant: `tool_name` is non-empty and unique within its containing
/// [`ToolCatalogSnapshot`] — the snapshot's key equals `tool_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub tool_name: String,
    pub description: String,
    #[serde(default)]
    pub input_schema: Option<Value>,
    pub endpoint_descriptor: EndpointDescriptor,
    pub effective_policy: ResolutionResult,
}

/// Immutable snapshot of the compiled tool catalog (spec §3
/// `ToolCatalogSnapshot`). Published once, read without locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCatalogSnapshot {
    pub created_utc: DateTime<Utc>,
    pub policy_source_version: String,
    pub tools_by_name: HashMap<String, ToolDescriptor>,
}

impl ToolCatalogSnapshot {
    pub fn empty() -> Self {
        Self {
            created_utc: Utc::now(),
            policy_source_version: String::new(),
            tools_by_name: HashMap::new(),
        }
    }

    /// Enforces that every map key equals its descriptor's `tool_name`
    /// (spec §3 `Validate()`).
    pub fn validate(&self) -> crate::error::Result<()> {
        for (key, tool) in &self.tools_by_name {
            if key != &tool.tool_name {
                return Err(crate::error::Error::Internal(format!(
                    "snapshot key '{key}' does not match tool_name '{}'",
                    tool.tool_name
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools_by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools_by_name.is_empty()
    }
}

/// A single diagnostic entry emitted alongside a compiled snapshot
/// (spec §4.3 "Gap report").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapEntry {
    pub kind: GapKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapKind {
    UnmatchedEndpoint,
    MissingSchema,
    AuthInference,
    DuplicateName,
    ToolNameCollision,
    Disabled,
    NoToolName,
}

/// Diagnostics produced by the catalog compiler (spec §4.3 `MappingGapReport`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingGapReport {
    pub entries: Vec<GapEntry>,
}

impl MappingGapReport {
    pub fn push(&mut self, kind: GapKind, detail: impl Into<String>) {
        self.entries.push(GapEntry {
            kind,
            detail: detail.into(),
        });
    }
}
