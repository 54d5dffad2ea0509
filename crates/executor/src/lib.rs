//! Tool Executor (spec §4.6): expands a tool's endpoint descriptor into an
//! HTTP request, attaches auth, enforces linked cancellation, and
//! classifies the response.

pub mod auth;
pub mod classify;
pub mod convert;
pub mod executor;
pub mod uri;

pub use auth::AuthContext;
pub use executor::{Executor, ExecutorSettings, FailureKind, ToolResult};
