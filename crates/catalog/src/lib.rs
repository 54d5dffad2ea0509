//! `sa-catalog` — the catalog compiler, stable tool-name derivation, and
//! the wait-free snapshot provider (spec §4.3, §4.3.1, §4.4).

pub mod compiler;
pub mod name;
pub mod snapshot;

pub use snapshot::{EndpointSource, SnapshotProvider, StaticEndpointSource};
