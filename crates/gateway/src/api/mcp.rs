//! `POST /mcp` (spec §6): the single JSON-RPC 2.0 entry point.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use sa_executor::AuthContext;
use sa_protocol::dispatcher::Dispatcher;
use sa_protocol::jsonrpc::{ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};

use crate::dispatch::{GatewayCatalog, GatewayInvoker};
use crate::state::AppState;

use super::{SERVER_NAME, SERVER_VERSION};

pub async fn handle(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("application/json") {
        return rpc_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            None,
            ErrorCode::InvalidRequest,
            "content-type must be application/json",
        );
    }

    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return rpc_error(
                StatusCode::BAD_REQUEST,
                None,
                ErrorCode::ParseError,
                format!("malformed JSON: {e}"),
            )
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            return rpc_error(
                StatusCode::BAD_REQUEST,
                None,
                ErrorCode::InvalidRequest,
                format!("invalid JSON-RPC request: {e}"),
            )
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return rpc_error(
            StatusCode::BAD_REQUEST,
            request.id.clone(),
            ErrorCode::InvalidRequest,
            "jsonrpc must be \"2.0\"",
        );
    }

    let auth = bearer_auth_context(&headers);
    let catalog = GatewayCatalog {
        state: state.clone(),
    };
    let invoker = GatewayInvoker {
        state: state.clone(),
        auth,
        cancel: CancellationToken::new(),
    };
    let dispatcher = Dispatcher::new(SERVER_NAME, SERVER_VERSION);

    match dispatcher.dispatch(request, &catalog, &invoker).await {
        Some(response) => Json(response).into_response(),
        // Notifications never get a response body (spec §9).
        None => StatusCode::ACCEPTED.into_response(),
    }
}

fn bearer_auth_context(headers: &HeaderMap) -> Option<AuthContext> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| AuthContext::BearerToken(t.to_string()))
}

fn rpc_error(
    status: StatusCode,
    id: Option<sa_protocol::jsonrpc::RequestId>,
    code: ErrorCode,
    message: impl Into<String>,
) -> Response {
    let err = JsonRpcError::new(code, message);
    (status, Json(JsonRpcResponse::error(id, err))).into_response()
}
