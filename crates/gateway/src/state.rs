use std::sync::Arc;

use sa_domain::config::Config;
use sa_domain::provider::{FilePolicyConfigProvider, PolicyConfigProvider, StaticPolicyConfigProvider};

/// Shared application state passed to all API handlers.
///
/// - **catalog** — the locally-hosted tool catalog (spec §4.3/§4.4): the
///   endpoints this gateway exposes directly, policy-filtered and compiled.
/// - **aggregator** — the remote upstream tool catalog (spec §4.5): tools
///   fanned out from configured MCP servers, namespaced and filtered.
/// - **executor** — executes local-catalog tool calls over HTTP (spec §4.6).
/// - **redactor** — optional outbound redaction filter (spec §4.8).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<sa_catalog::SnapshotProvider>,
    pub aggregator: Arc<sa_mcp_client::GatewayAggregator>,
    pub executor: Arc<sa_executor::Executor>,
    pub redactor: Arc<sa_redaction::Redactor>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn build(config: Arc<Config>) -> Self {
        let policy_provider: Arc<dyn PolicyConfigProvider> = match &config.policy_source {
            sa_domain::config::PolicySourceConfig::None => {
                Arc::new(StaticPolicyConfigProvider::new(Default::default()))
            }
            sa_domain::config::PolicySourceConfig::File { path } => {
                Arc::new(FilePolicyConfigProvider::new(path.clone()))
            }
        };

        let endpoint_source = Arc::new(sa_catalog::StaticEndpointSource::new(
            config.catalog.endpoints.clone(),
            config.catalog.enrichment.clone(),
        ));

        let catalog = Arc::new(sa_catalog::SnapshotProvider::new(
            policy_provider,
            endpoint_source,
            config.catalog.min_reload_interval_ms,
        ));

        let aggregator = Arc::new(sa_mcp_client::GatewayAggregator::new(config.gateway.clone()));

        let http_client = reqwest::Client::new();
        let executor = Arc::new(sa_executor::Executor::new(
            http_client.clone(),
            sa_executor::ExecutorSettings {
                default_timeout_ms: config.executor.default_timeout_ms,
                max_request_content_length_bytes: config.executor.max_request_content_length_bytes,
                local_base_url: config.executor.local_base_url.clone(),
            },
        ));

        let redactor = Arc::new(sa_redaction::Redactor::new(config.redaction.clone()));

        Self {
            config,
            catalog,
            aggregator,
            executor,
            redactor,
            http_client,
        }
    }
}
