//! `sa-rules` — the generic rule engine and the policy resolver built on
//! top of it.
//!
//! [`engine`] is deliberately domain-agnostic: it is reused both here (the
//! three endpoint-matching rules, spec §4.2) and by `sa-catalog`'s
//! admission pipeline. [`policy`] is the spec §4.1 resolver.

pub mod engine;
pub mod policy;
