//! `sa-gateway` — the MCP gateway binary: an HTTP host that serves a local
//! tool catalog (spec §4.3, §4.4), aggregates remote MCP upstreams
//! (spec §4.5), executes tool calls (spec §4.6), and redacts outbound
//! content (spec §4.8) behind a single JSON-RPC dispatcher (spec §4.7).

pub mod api;
pub mod cli;
pub mod dispatch;
pub mod state;
