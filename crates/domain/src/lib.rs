//! `sa-domain` — shared data model, configuration, and error taxonomy for
//! the Contextify gateway.
//!
//! This crate owns the immutable entities every other crate builds on:
//! policies and rate limits ([`policy`]), endpoint and tool descriptors
//! ([`endpoint`]), the gateway aggregation model ([`gateway`]), the TOML
//! [`config::Config`] root, and the shared [`error::Error`] taxonomy.
//! Nothing in here performs I/O beyond the reference
//! [`provider::PolicyConfigProvider`] implementations.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod policy;
pub mod provider;
