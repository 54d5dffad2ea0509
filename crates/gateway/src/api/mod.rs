//! The HTTP surface (spec §6): `POST /mcp`, the contextify manifest,
//! diagnostics, and a health check.

pub mod diagnostics;
pub mod health;
pub mod manifest;
pub mod mcp;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub const SERVER_NAME: &str = "sa-gateway";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn router(diagnostics_path: &str) -> Router<AppState> {
    Router::new()
        .route("/mcp", post(mcp::handle))
        .route("/.well-known/contextify/manifest", get(manifest::handle))
        .route("/health", get(health::handle))
        .route(&format!("/{diagnostics_path}"), get(diagnostics::handle))
}
