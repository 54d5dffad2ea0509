//! HTTP transport to a single upstream MCP server (spec §4.5, §6): a JSON-RPC
//! 2.0 POST per call, `application/json`, no persistent connection state
//! beyond the shared [`reqwest::Client`].

use std::time::Duration;

use sa_protocol::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect/read failure: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned non-2xx status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    MalformedBody(String),
    #[error("upstream returned a JSON-RPC error: {0}")]
    Rpc(JsonRpcError),
}

/// Sends a single JSON-RPC request to `endpoint` and returns the parsed
/// response, enforcing `timeout`.
pub async fn call(
    client: &reqwest::Client,
    endpoint: &str,
    request: &JsonRpcRequest,
    timeout: Duration,
    default_headers: &std::collections::HashMap<String, String>,
) -> Result<JsonRpcResponse, TransportError> {
    let mut builder = client
        .post(endpoint)
        .header("content-type", "application/json")
        .timeout(timeout)
        .json(request);

    for (k, v) in default_headers {
        builder = builder.header(k.as_str(), v.as_str());
    }

    let resp = builder.send().await.map_err(|e| {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Http(e.to_string())
        }
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }

    let body: JsonRpcResponse = resp
        .json()
        .await
        .map_err(|e| TransportError::MalformedBody(e.to_string()))?;

    Ok(body)
}

/// Convenience wrapper issuing a `tools/list` request with a fixed id.
pub async fn tools_list(
    client: &reqwest::Client,
    endpoint: &str,
    timeout: Duration,
    default_headers: &std::collections::HashMap<String, String>,
) -> Result<serde_json::Value, TransportError> {
    let request = JsonRpcRequest::new(RequestId::Number(1), "tools/list", None);
    let response = call(client, endpoint, &request, timeout, default_headers).await?;
    match response.error {
        Some(err) => Err(TransportError::Rpc(err)),
        None => Ok(response.result.unwrap_or(serde_json::Value::Null)),
    }
}

/// Convenience wrapper issuing a `tools/call` request with a fixed id.
pub async fn tools_call(
    client: &reqwest::Client,
    endpoint: &str,
    tool_name: &str,
    arguments: serde_json::Value,
    timeout: Duration,
    default_headers: &std::collections::HashMap<String, String>,
) -> Result<serde_json::Value, TransportError> {
    let params = serde_json::json!({ "name": tool_name, "arguments": arguments });
    let request = JsonRpcRequest::new(RequestId::Number(1), "tools/call", Some(params));
    let response = call(client, endpoint, &request, timeout, default_headers).await?;
    match response.error {
        Some(err) => Err(TransportError::Rpc(err)),
        None => Ok(response.result.unwrap_or(serde_json::Value::Null)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        assert_eq!(
            TransportError::Status(500).to_string(),
            "upstream returned non-2xx status 500"
        );
    }
}
