//! Snapshot Provider (spec §4.4): holds the current [`ToolCatalogSnapshot`]
//! behind a single atomic pointer-sized reference, published via
//! [`arc_swap::ArcSwap`] — wait-free reads, atomic publish-once-build
//! writes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use sa_domain::endpoint::{EndpointDescriptor, OpenApiEnrichment, ToolCatalogSnapshot};
use sa_domain::error::Result;
use sa_domain::provider::PolicyConfigProvider;

use crate::compiler;

/// Supplies the endpoint descriptors and OpenAPI enrichment compiled on
/// every reload. Concrete sources (an OpenAPI document loader, a static
/// list) are the hosting application's concern (spec §1); only the
/// interface lives here.
#[async_trait::async_trait]
pub trait EndpointSource: Send + Sync {
    async fn endpoints(&self) -> Result<Vec<EndpointDescriptor>>;
    async fn enrichment(&self) -> Result<HashMap<String, OpenApiEnrichment>> {
        Ok(HashMap::new())
    }
}

/// An endpoint source backed by a fixed, in-memory list — used when
/// endpoint descriptors come from static configuration rather than a
/// live discovery mechanism (OpenAPI parsing is out of scope, spec §1).
pub struct StaticEndpointSource {
    endpoints: Vec<EndpointDescriptor>,
    enrichment: HashMap<String, OpenApiEnrichment>,
}

impl StaticEndpointSource {
    pub fn new(
        endpoints: Vec<EndpointDescriptor>,
        enrichment: HashMap<String, OpenApiEnrichment>,
    ) -> Self {
        Self {
            endpoints,
            enrichment,
        }
    }
}

#[async_trait::async_trait]
impl EndpointSource for StaticEndpointSource {
    async fn endpoints(&self) -> Result<Vec<EndpointDescriptor>> {
        Ok(self.endpoints.clone())
    }

    async fn enrichment(&self) -> Result<HashMap<String, OpenApiEnrichment>> {
        Ok(self.enrichment.clone())
    }
}

/// Holds and refreshes the current [`ToolCatalogSnapshot`] (spec §4.4).
pub struct SnapshotProvider {
    current: ArcSwap<ToolCatalogSnapshot>,
    policy_provider: Arc<dyn PolicyConfigProvider>,
    endpoint_source: Arc<dyn EndpointSource>,
    min_reload_interval_ms: u64,
    last_reload_utc_ms: AtomicI64,
    last_source_version: ArcSwap<String>,
}

impl SnapshotProvider {
    pub fn new(
        policy_provider: Arc<dyn PolicyConfigProvider>,
        endpoint_source: Arc<dyn EndpointSource>,
        min_reload_interval_ms: u64,
    ) -> Self {
        Self {
            current: ArcSwap::from_pointee(ToolCatalogSnapshot::empty()),
            policy_provider,
            endpoint_source,
            min_reload_interval_ms,
            last_reload_utc_ms: AtomicI64::new(0),
            last_source_version: ArcSwap::from_pointee(String::new()),
        }
    }

    /// Wait-free: returns the current snapshot.
    pub fn get_snapshot(&self) -> Arc<ToolCatalogSnapshot> {
        self.current.load_full()
    }

    /// Fetches config, invokes the compiler, validates, publishes
    /// atomically. Provider fetch errors propagate (spec §4.4 "Failure
    /// model").
    pub async fn reload(&self) -> Result<Arc<ToolCatalogSnapshot>> {
        let policy = self.policy_provider.get().await?;
        let endpoints = self.endpoint_source.endpoints().await?;
        let enrichment = self.endpoint_source.enrichment().await?;

        let (snapshot, gap) = compiler::compile(&endpoints, &enrichment, &policy)?;
        snapshot.validate()?;

        if !gap.entries.is_empty() {
            tracing::info!(
                gap_entries = gap.entries.len(),
                "catalog compiled with gap report entries"
            );
            for entry in &gap.entries {
                tracing::debug!(kind = ?entry.kind, detail = %entry.detail, "gap report entry");
            }
        }

        let snapshot = Arc::new(snapshot);
        self.current.store(snapshot.clone());
        self.last_reload_utc_ms
            .store(now_ms(), Ordering::SeqCst);
        self.last_source_version
            .store(Arc::new(policy.source_version));
        Ok(snapshot)
    }

    /// Combined throttle (spec §4.4 `ensureFresh`): skip if within
    /// `min_reload_interval_ms`; skip (but bump `last_reload_utc`) if the
    /// source version hasn't changed; otherwise reload. On provider
    /// failure, logs and returns the previous snapshot so the service
    /// remains available.
    pub async fn ensure_fresh(&self) -> Arc<ToolCatalogSnapshot> {
        let elapsed = now_ms() - self.last_reload_utc_ms.load(Ordering::SeqCst);
        if elapsed >= 0 && (elapsed as u64) < self.min_reload_interval_ms {
            return self.get_snapshot();
        }

        match self.policy_provider.get().await {
            Ok(policy) => {
                if policy.source_version == **self.last_source_version.load() {
                    self.last_reload_utc_ms.store(now_ms(), Ordering::SeqCst);
                    return self.get_snapshot();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "ensure_fresh: policy provider fetch failed, keeping previous snapshot");
                return self.get_snapshot();
            }
        }

        match self.reload().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "ensure_fresh: reload failed, keeping previous snapshot");
                self.get_snapshot()
            }
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_domain::policy::PolicyConfig;
    use sa_domain::provider::StaticPolicyConfigProvider;

    struct FixedEndpoints(Vec<EndpointDescriptor>);

    #[async_trait::async_trait]
    impl EndpointSource for FixedEndpoints {
        async fn endpoints(&self) -> Result<Vec<EndpointDescriptor>> {
            Ok(self.0.clone())
        }
    }

    fn ep(route: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            route_template: route.into(),
            http_method: "GET".into(),
            operation_id: None,
            display_name: None,
            consumes: vec![],
            produces: vec![],
            requires_auth: false,
        }
    }

    #[tokio::test]
    async fn initial_snapshot_is_empty() {
        let provider = SnapshotProvider::new(
            Arc::new(StaticPolicyConfigProvider::new(PolicyConfig::default())),
            Arc::new(FixedEndpoints(vec![])),
            1000,
        );
        assert!(provider.get_snapshot().is_empty());
    }

    #[tokio::test]
    async fn reload_publishes_a_non_empty_snapshot() {
        let provider = SnapshotProvider::new(
            Arc::new(StaticPolicyConfigProvider::new(PolicyConfig::default())),
            Arc::new(FixedEndpoints(vec![ep("/api/foo")])),
            0,
        );
        let snapshot = provider.reload().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(provider.get_snapshot().len(), 1);
    }

    #[tokio::test]
    async fn ensure_fresh_skips_reload_within_throttle_window() {
        let provider = SnapshotProvider::new(
            Arc::new(StaticPolicyConfigProvider::new(PolicyConfig::default())),
            Arc::new(FixedEndpoints(vec![ep("/api/foo")])),
            60_000,
        );
        provider.reload().await.unwrap();
        let snapshot = provider.ensure_fresh().await;
        assert_eq!(snapshot.len(), 1);
    }
}
