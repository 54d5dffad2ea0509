//! JSON-RPC Dispatcher (spec §4.7): routes `initialize`, `tools/list`, and
//! `tools/call`, maps errors onto the standard JSON-RPC codes, and never
//! responds to a notification (no `id`).
//!
//! The dispatcher is generic over [`ToolCatalog`] and [`ToolInvoker`] so
//! this crate stays free of a dependency on `sa-catalog`/`sa-executor`;
//! `sa-gateway` wires the concrete implementations together.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::jsonrpc::{
    ContentBlock, ErrorCode, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    RequestId, ServerCapabilities, ServerInfo, ToolCallParams, ToolCallResult, ToolListEntry,
    ToolsListResult, MCP_PROTOCOL_VERSION,
};

pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const PING: &str = "ping";
}

/// Read access to the published tool catalog snapshot.
pub trait ToolCatalog: Send + Sync {
    fn list_tools(&self) -> Vec<ToolListEntry>;
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
}

/// Executes a tool call against whichever backend resolved the tool.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult, InvokeError>;
}

pub struct Dispatcher<'a> {
    pub server_name: &'a str,
    pub server_version: &'a str,
}

impl<'a> Dispatcher<'a> {
    pub fn new(server_name: &'a str, server_version: &'a str) -> Self {
        Self {
            server_name,
            server_version,
        }
    }

    /// Dispatches a single request. Returns `None` for notifications — the
    /// caller must not write anything to the wire in that case (spec §9).
    pub async fn dispatch(
        &self,
        request: JsonRpcRequest,
        catalog: &dyn ToolCatalog,
        invoker: &dyn ToolInvoker,
    ) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let is_notification = request.is_notification();

        let result = self.route(request, catalog, invoker).await;

        if is_notification {
            return None;
        }

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => JsonRpcResponse::error(id, err),
        })
    }

    async fn route(
        &self,
        request: JsonRpcRequest,
        catalog: &dyn ToolCatalog,
        invoker: &dyn ToolInvoker,
    ) -> Result<Value, JsonRpcError> {
        match request.method.as_str() {
            methods::INITIALIZE => Ok(serde_json::to_value(self.initialize_result())
                .expect("InitializeResult always serializes")),
            methods::INITIALIZED => Ok(Value::Null),
            methods::PING => Ok(Value::Null),
            methods::TOOLS_LIST => {
                let result = ToolsListResult {
                    tools: catalog.list_tools(),
                };
                Ok(serde_json::to_value(result).expect("ToolsListResult always serializes"))
            }
            methods::TOOLS_CALL => self.handle_tools_call(request.params, invoker).await,
            other => Err(JsonRpcError::new(
                ErrorCode::MethodNotFound,
                format!("unknown method: {other}"),
            )),
        }
    }

    async fn handle_tools_call(
        &self,
        params: Option<Value>,
        invoker: &dyn ToolInvoker,
    ) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| {
            JsonRpcError::new(ErrorCode::InvalidParams, "tools/call requires params")
        })?;
        let params: ToolCallParams = serde_json::from_value(params).map_err(|e| {
            JsonRpcError::new(ErrorCode::InvalidParams, format!("invalid params: {e}"))
        })?;

        match invoker.call_tool(&params.name, params.arguments).await {
            Ok(result) => {
                Ok(serde_json::to_value(result).expect("ToolCallResult always serializes"))
            }
            Err(InvokeError::UnknownTool(name)) => Err(JsonRpcError::new(
                ErrorCode::InvalidParams,
                format!("unknown tool: {name}"),
            )),
            Err(InvokeError::InvalidArguments(msg)) => {
                Err(JsonRpcError::new(ErrorCode::InvalidParams, msg))
            }
            Err(InvokeError::Execution(msg)) => {
                // Full cause stays in the server log; the client only ever
                // sees a correlation id (spec §4.7, SPEC_FULL.md §10.1).
                let correlation_id = Uuid::new_v4().to_string();
                tracing::error!(correlation_id = %correlation_id, error = %msg, "tool execution failed");
                Err(JsonRpcError::internal(correlation_id))
            }
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: self.server_name.to_string(),
                version: self.server_version.to_string(),
            },
            capabilities: ServerCapabilities::default(),
        }
    }
}

/// Convenience for callers that already have a `ToolCallResult` text body.
pub fn text_result(text: impl Into<String>, is_error: bool) -> ToolCallResult {
    ToolCallResult {
        content: vec![ContentBlock::Text { text: text.into() }],
        is_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyCatalog;
    impl ToolCatalog for EmptyCatalog {
        fn list_tools(&self) -> Vec<ToolListEntry> {
            Vec::new()
        }
    }

    struct EchoInvoker;
    #[async_trait]
    impl ToolInvoker for EchoInvoker {
        async fn call_tool(&self, name: &str, _args: Value) -> Result<ToolCallResult, InvokeError> {
            if name == "boom" {
                return Err(InvokeError::Execution("kaboom".into()));
            }
            Ok(text_result(format!("called {name}"), false))
        }
    }

    #[tokio::test]
    async fn notification_produces_no_response() {
        let dispatcher = Dispatcher::new("gw", "0.1.0");
        let req = JsonRpcRequest::notification(methods::INITIALIZED, None);
        let resp = dispatcher.dispatch(req, &EmptyCatalog, &EchoInvoker).await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn unknown_method_maps_to_method_not_found() {
        let dispatcher = Dispatcher::new("gw", "0.1.0");
        let req = JsonRpcRequest::new(RequestId::Number(1), "bogus/method", None);
        let resp = dispatcher
            .dispatch(req, &EmptyCatalog, &EchoInvoker)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, ErrorCode::MethodNotFound.as_i32());
    }

    #[tokio::test]
    async fn tools_call_missing_params_is_invalid_params() {
        let dispatcher = Dispatcher::new("gw", "0.1.0");
        let req = JsonRpcRequest::new(RequestId::Number(1), methods::TOOLS_CALL, None);
        let resp = dispatcher
            .dispatch(req, &EmptyCatalog, &EchoInvoker)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidParams.as_i32());
    }

    #[tokio::test]
    async fn execution_error_carries_only_correlation_id() {
        let dispatcher = Dispatcher::new("gw", "0.1.0");
        let params = serde_json::json!({"name": "boom", "arguments": {}});
        let req = JsonRpcRequest::new(RequestId::Number(1), methods::TOOLS_CALL, Some(params));
        let resp = dispatcher
            .dispatch(req, &EmptyCatalog, &EchoInvoker)
            .await
            .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, ErrorCode::InternalError.as_i32());
        let data = err.data.unwrap();
        assert!(data["correlationId"].is_string());
        assert!(!err.message.contains("kaboom"));
    }

    #[tokio::test]
    async fn initialize_reports_protocol_version() {
        let dispatcher = Dispatcher::new("gw", "0.1.0");
        let req = JsonRpcRequest::new(RequestId::Number(1), methods::INITIALIZE, None);
        let resp = dispatcher
            .dispatch(req, &EmptyCatalog, &EchoInvoker)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
    }
}
