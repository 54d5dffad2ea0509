//! `GET /<diagnostics-path>` (spec §6): catalog and gateway health snapshot.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn handle(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.catalog.get_snapshot();
    let gateway = state.aggregator.get_snapshot();

    Json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "catalog": {
            "totalTools": catalog.len(),
            "policySourceVersion": catalog.policy_source_version,
            "totalUpstreams": gateway.upstream_status.len(),
            "healthyUpstreams": gateway.healthy_upstream_count(),
            "aggregatedTools": gateway.tools_by_name.len(),
        },
    }))
}
