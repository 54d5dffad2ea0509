use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::endpoint::{EndpointDescriptor, OpenApiEnrichment};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Catalog Compiler & Snapshot Engine (spec §4.3, §4.4)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The catalog's endpoint descriptors and OpenAPI enrichment as static
/// configuration. OpenAPI document parsing itself is out of scope (spec
/// §1 Non-goals); this config section holds whatever schemas/descriptions
/// a prior extraction step already produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub endpoints: Vec<EndpointDescriptor>,
    /// Keyed on `operationId`.
    #[serde(default)]
    pub enrichment: HashMap<String, OpenApiEnrichment>,
    #[serde(default = "d_min_reload_interval_ms")]
    pub min_reload_interval_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            enrichment: HashMap::new(),
            min_reload_interval_ms: d_min_reload_interval_ms(),
        }
    }
}

fn d_min_reload_interval_ms() -> u64 {
    1_000
}
