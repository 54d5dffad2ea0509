//! The `PolicyConfigProvider` capability (spec §1, §9): the external
//! collaborator that supplies [`PolicyConfig`] documents. Concrete sources
//! (file watcher, Consul poller, …) are out of scope for this crate; only
//! the interface lives here, re-expressed as a capability trait rather than
//! an interface hierarchy (spec §9 "Polymorphism").

use async_trait::async_trait;

use crate::error::Result;
use crate::policy::PolicyConfig;

/// Supplies the current [`PolicyConfig`]. Implementations must be
/// thread-safe: `get` may be called concurrently from many readers
/// (spec §5 "Shared resources").
#[async_trait]
pub trait PolicyConfigProvider: Send + Sync {
    async fn get(&self) -> Result<PolicyConfig>;
}

/// A provider that always returns a fixed, in-memory config. Used in tests
/// and as the default when no external source is configured.
pub struct StaticPolicyConfigProvider {
    config: PolicyConfig,
}

impl StaticPolicyConfigProvider {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PolicyConfigProvider for StaticPolicyConfigProvider {
    async fn get(&self) -> Result<PolicyConfig> {
        Ok(self.config.clone())
    }
}

/// Loads a [`PolicyConfig`] from a JSON file on disk, bumping `sourceVersion`
/// on every successful read using a content hash so that
/// [`crate::endpoint::ToolCatalogSnapshot`] reloaders can detect a no-op
/// reload even if the file's mtime changed without content changes.
pub struct FilePolicyConfigProvider {
    path: std::path::PathBuf,
}

impl FilePolicyConfigProvider {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PolicyConfigProvider for FilePolicyConfigProvider {
    async fn get(&self) -> Result<PolicyConfig> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(crate::error::Error::Io)?;
        let mut config: PolicyConfig = serde_json::from_slice(&bytes)?;
        if config.source_version.is_empty() {
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            config.source_version = hex::encode(&hasher.finalize()[..8]);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_fixed_config() {
        let cfg = PolicyConfig {
            deny_by_default: true,
            ..Default::default()
        };
        let provider = StaticPolicyConfigProvider::new(cfg);
        let got = provider.get().await.unwrap();
        assert!(got.deny_by_default);
    }
}
