//! Wires the local catalog and the gateway aggregator into the
//! `sa_protocol` dispatcher traits (spec §4.7). `GatewayCatalog` is cheap
//! to construct per request; `GatewayInvoker` is request-scoped because it
//! carries the caller's auth context and cancellation token (spec §4.6
//! step 6 "linked cancellation").

use std::time::Duration;

use sa_domain::endpoint::ToolDescriptor;
use sa_domain::gateway::NamespacedTool;
use sa_executor::{AuthContext, ToolResult};
use sa_protocol::dispatcher::{text_result, InvokeError, ToolCatalog, ToolInvoker};
use sa_protocol::jsonrpc::{ToolCallResult, ToolListEntry};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

enum ResolvedTool {
    Local(ToolDescriptor),
    Upstream(NamespacedTool),
}

pub struct GatewayCatalog {
    pub state: AppState,
}

impl ToolCatalog for GatewayCatalog {
    fn list_tools(&self) -> Vec<ToolListEntry> {
        let local = self.state.catalog.get_snapshot();
        let remote = self.state.aggregator.get_snapshot();

        let mut entries: Vec<ToolListEntry> = local
            .tools_by_name
            .values()
            .map(|t| ToolListEntry {
                name: t.tool_name.clone(),
                description: Some(t.description.clone()),
                input_schema: t.input_schema.clone(),
            })
            .collect();

        entries.extend(remote.tools_by_name.values().map(|t| ToolListEntry {
            name: t.namespaced_name.clone(),
            description: t.description.clone(),
            input_schema: t.input_schema.clone(),
        }));

        entries
    }
}

pub struct GatewayInvoker {
    pub state: AppState,
    pub auth: Option<AuthContext>,
    pub cancel: CancellationToken,
}

impl GatewayInvoker {
    fn resolve(&self, name: &str) -> Option<ResolvedTool> {
        if let Some(tool) = self.state.catalog.get_snapshot().get(name) {
            return Some(ResolvedTool::Local(tool.clone()));
        }
        self.state
            .aggregator
            .get_snapshot()
            .tools_by_name
            .get(name)
            .cloned()
            .map(ResolvedTool::Upstream)
    }

    fn local_result(&self, result: ToolResult) -> ToolCallResult {
        match result {
            ToolResult::Success(resp) => {
                let text = match resp.json {
                    Some(json) => serde_json::to_string(&self.state.redactor.redact_json(json))
                        .unwrap_or(resp.text),
                    None => self.state.redactor.redact_text(&resp.text).into_owned(),
                };
                text_result(text, false)
            }
            ToolResult::Failure { kind, message } => {
                text_result(format!("{}: {message}", kind.code()), true)
            }
        }
    }
}

#[async_trait::async_trait]
impl ToolInvoker for GatewayInvoker {
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult, InvokeError> {
        let resolved = self
            .resolve(name)
            .ok_or_else(|| InvokeError::UnknownTool(name.to_string()))?;

        match resolved {
            ResolvedTool::Local(tool) => {
                let result = self
                    .state
                    .executor
                    .execute(&tool, arguments, self.auth.as_ref(), self.cancel.clone())
                    .await;
                Ok(self.local_result(result))
            }
            ResolvedTool::Upstream(tool) => {
                let gateway_config = self.state.aggregator.config();
                let upstream = gateway_config
                    .upstreams
                    .iter()
                    .find(|u| u.upstream_name == tool.upstream_name)
                    .ok_or_else(|| {
                        InvokeError::Execution(format!(
                            "upstream '{}' no longer configured",
                            tool.upstream_name
                        ))
                    })?;

                let timeout = Duration::from_millis(upstream.request_timeout_ms);
                match sa_mcp_client::http::tools_call(
                    &self.state.http_client,
                    &upstream.mcp_http_endpoint,
                    &tool.upstream_tool_name,
                    arguments,
                    timeout,
                    &upstream.default_headers,
                )
                .await
                {
                    Ok(value) => serde_json::from_value(value).map_err(|e| {
                        InvokeError::Execution(format!(
                            "malformed upstream tools/call result: {e}"
                        ))
                    }),
                    Err(e) => Ok(text_result(e.to_string(), true)),
                }
            }
        }
    }
}
