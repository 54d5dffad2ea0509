//! `sa-mcp-client` — the gateway aggregator: fans `tools/list` out to
//! remote MCP upstreams over HTTP, namespaces and filters the results, and
//! tracks per-upstream health (spec §4.5).
//!
//! Wire types live in [`sa_protocol::jsonrpc`]; this crate is the HTTP
//! client side of that protocol, the way the original client-only crate
//! spoke it over stdio to local child processes.

pub mod aggregator;
pub mod http;

pub use aggregator::GatewayAggregator;
pub use http::TransportError;
