//! `GET /.well-known/contextify/manifest` (spec §6).

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

use super::SERVER_NAME;

pub async fn handle(State(state): State<AppState>) -> Json<Value> {
    let mcp_endpoint = format!(
        "http://{}:{}/mcp",
        state.config.server.host, state.config.server.port
    );
    Json(json!({
        "name": SERVER_NAME,
        "mcpEndpoint": mcp_endpoint,
        "capabilities": { "tools": { "list": true, "call": true } },
    }))
}
