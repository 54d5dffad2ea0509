//! Tool Executor (spec §4.6): turns a resolved [`ToolDescriptor`] plus call
//! arguments into an HTTP request, enforces the linked timeout/cancellation,
//! and classifies the response.

use std::time::Duration;

use sa_domain::endpoint::ToolDescriptor;
use sa_domain::policy::AuthPropagationMode;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::auth::AuthContext;
use crate::classify::{classify, ClassifiedResponse};
use crate::uri::{build_query_string, expand_template};

const METHODS_WITH_BODY: [&str; 3] = ["POST", "PUT", "PATCH"];

#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub default_timeout_ms: u64,
    pub max_request_content_length_bytes: usize,
    pub local_base_url: Option<String>,
}

/// Coarse failure category (spec §4.6 step 9). `HttpStatus` covers the
/// non-2xx classification from step 8; the rest are exception categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    NoEndpoint,
    HttpStatus(u16),
    Timeout,
    Cancelled,
    HttpError,
    JsonParseError,
    Unexpected,
}

impl FailureKind {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NoEndpoint => false,
            Self::HttpStatus(status) => crate::classify::is_transient_status(*status),
            Self::Timeout | Self::Cancelled | Self::HttpError => true,
            Self::JsonParseError | Self::Unexpected => false,
        }
    }

    pub fn code(&self) -> String {
        match self {
            Self::NoEndpoint => "NO_ENDPOINT".to_string(),
            Self::HttpStatus(status) => format!("HTTP_{status}"),
            Self::Timeout => "TIMEOUT".to_string(),
            Self::Cancelled => "CANCELLED".to_string(),
            Self::HttpError => "HTTP_ERROR".to_string(),
            Self::JsonParseError => "JSON_PARSE_ERROR".to_string(),
            Self::Unexpected => "UNEXPECTED".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ToolResult {
    Success(ClassifiedResponse),
    Failure { kind: FailureKind, message: String },
}

impl ToolResult {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Success(resp) => resp.is_transient,
            Self::Failure { kind, .. } => kind.is_transient(),
        }
    }
}

pub struct Executor {
    client: reqwest::Client,
    settings: ExecutorSettings,
}

impl Executor {
    pub fn new(client: reqwest::Client, settings: ExecutorSettings) -> Self {
        Self { client, settings }
    }

    pub async fn execute(
        &self,
        tool: &ToolDescriptor,
        arguments: Value,
        auth: Option<&AuthContext>,
        caller_cancel: CancellationToken,
    ) -> ToolResult {
        let descriptor = &tool.endpoint_descriptor;
        if descriptor.route_template.is_empty() {
            return ToolResult::Failure {
                kind: FailureKind::NoEndpoint,
                message: "endpoint descriptor has no route template".into(),
            };
        }

        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        let expanded = expand_template(&descriptor.route_template, &arguments);
        let url = match self.resolve_url(&expanded.path) {
            Some(url) => url,
            None => {
                return ToolResult::Failure {
                    kind: FailureKind::NoEndpoint,
                    message: "route template is relative and no local base URL is configured"
                        .into(),
                }
            }
        };

        let query = build_query_string(&arguments, &expanded.consumed);
        let url = if query.is_empty() {
            url
        } else {
            format!("{url}?{query}")
        };

        let method = http_method(&descriptor.http_method);
        let mut builder = self.client.request(method.clone(), &url);

        if METHODS_WITH_BODY.contains(&method.as_str()) {
            if let Some(body) = arguments.get("body") {
                match serde_json::to_vec(body) {
                    Ok(bytes) => {
                        if bytes.len() > self.settings.max_request_content_length_bytes {
                            tracing::warn!(
                                tool = %tool.tool_name,
                                encoded_bytes = bytes.len(),
                                limit = self.settings.max_request_content_length_bytes,
                                "request body exceeds configured content-length limit"
                            );
                        }
                        builder = builder.header("content-type", "application/json").body(bytes);
                    }
                    Err(e) => {
                        return ToolResult::Failure {
                            kind: FailureKind::JsonParseError,
                            message: format!("failed to serialize body: {e}"),
                        }
                    }
                }
            }
        }

        builder = self.attach_auth(builder, tool, descriptor.requires_auth, auth);

        let timeout_ms = tool.effective_policy.timeout_ms.unwrap_or(self.settings.default_timeout_ms);
        let timeout = Duration::from_millis(timeout_ms);

        tokio::select! {
            biased;
            _ = caller_cancel.cancelled() => ToolResult::Failure {
                kind: FailureKind::Cancelled,
                message: "cancelled by caller".into(),
            },
            _ = tokio::time::sleep(timeout) => ToolResult::Failure {
                kind: FailureKind::Timeout,
                message: format!("tool call exceeded {timeout_ms}ms"),
            },
            result = send(builder) => result,
        }
    }

    fn resolve_url(&self, path: &str) -> Option<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        let base = self.settings.local_base_url.as_deref()?;
        Some(format!("{}{}", base.trim_end_matches('/'), path))
    }

    fn attach_auth(
        &self,
        builder: reqwest::RequestBuilder,
        tool: &ToolDescriptor,
        requires_auth: bool,
        auth: Option<&AuthContext>,
    ) -> reqwest::RequestBuilder {
        let mode = tool.effective_policy.auth_propagation_mode;
        let effective_mode = match mode {
            AuthPropagationMode::Infer if requires_auth => AuthPropagationMode::BearerToken,
            AuthPropagationMode::Infer => AuthPropagationMode::None,
            other => other,
        };

        let Some(auth) = auth else {
            return builder;
        };

        match effective_mode {
            AuthPropagationMode::None => builder,
            AuthPropagationMode::BearerToken => match auth.bearer_header() {
                Some(header) => builder.header("authorization", header),
                None => builder,
            },
            AuthPropagationMode::Cookies => match auth.cookie_header() {
                Some(header) => builder.header("cookie", header),
                None => builder,
            },
            AuthPropagationMode::Infer => unreachable!("resolved above"),
        }
    }
}

async fn send(builder: reqwest::RequestBuilder) -> ToolResult {
    let response = match builder.send().await {
        Ok(r) => r,
        Err(e) => {
            return ToolResult::Failure {
                kind: FailureKind::HttpError,
                message: e.to_string(),
            }
        }
    };

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = match response.bytes().await {
        Ok(b) => b,
        Err(e) => {
            return ToolResult::Failure {
                kind: FailureKind::HttpError,
                message: e.to_string(),
            }
        }
    };

    let classified = classify(status, &content_type, &body);
    if classified.is_error {
        return ToolResult::Failure {
            kind: FailureKind::HttpStatus(status),
            message: classified.text,
        };
    }
    ToolResult::Success(classified)
}

fn http_method(raw: &str) -> reqwest::Method {
    raw.to_uppercase()
        .parse()
        .unwrap_or(reqwest::Method::GET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_domain::endpoint::EndpointDescriptor;
    use sa_domain::policy::{PolicySource, ResolutionResult};

    fn descriptor(route: &str, method: &str) -> EndpointDescriptor {
        EndpointDescriptor {
            route_template: route.to_string(),
            http_method: method.to_string(),
            operation_id: None,
            display_name: None,
            consumes: vec![],
            produces: vec![],
            requires_auth: false,
        }
    }

    fn tool(route: &str, method: &str) -> ToolDescriptor {
        ToolDescriptor {
            tool_name: "GET_test".into(),
            description: "test".into(),
            input_schema: None,
            endpoint_descriptor: descriptor(route, method),
            effective_policy: ResolutionResult::enabled_default(),
        }
    }

    #[tokio::test]
    async fn empty_route_template_is_no_endpoint() {
        let mut t = tool("", "GET");
        t.endpoint_descriptor.route_template = String::new();
        let executor = Executor::new(
            reqwest::Client::new(),
            ExecutorSettings {
                default_timeout_ms: 1000,
                max_request_content_length_bytes: 1024,
                local_base_url: None,
            },
        );
        let result = executor
            .execute(&t, Value::Null, None, CancellationToken::new())
            .await;
        match result {
            ToolResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::NoEndpoint),
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn relative_route_without_base_url_is_no_endpoint() {
        let t = tool("/api/items/{id}", "GET");
        let executor = Executor::new(
            reqwest::Client::new(),
            ExecutorSettings {
                default_timeout_ms: 1000,
                max_request_content_length_bytes: 1024,
                local_base_url: None,
            },
        );
        let result = executor
            .execute(&t, serde_json::json!({"id": 1}), None, CancellationToken::new())
            .await;
        match result {
            ToolResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::NoEndpoint),
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn caller_cancellation_is_reported_as_cancelled() {
        let t = tool("http://127.0.0.1:9/slow", "GET");
        let executor = Executor::new(
            reqwest::Client::new(),
            ExecutorSettings {
                default_timeout_ms: 60_000,
                max_request_content_length_bytes: 1024,
                local_base_url: None,
            },
        );
        let token = CancellationToken::new();
        token.cancel();
        let result = executor.execute(&t, Value::Null, None, token).await;
        match result {
            ToolResult::Failure { kind, .. } => assert_eq!(kind, FailureKind::Cancelled),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn failure_kind_codes_match_spec_vocabulary() {
        assert_eq!(FailureKind::NoEndpoint.code(), "NO_ENDPOINT");
        assert_eq!(FailureKind::HttpStatus(503).code(), "HTTP_503");
        assert_eq!(FailureKind::Timeout.code(), "TIMEOUT");
        assert_eq!(FailureKind::Cancelled.code(), "CANCELLED");
        assert!(FailureKind::Timeout.is_transient());
        assert!(!FailureKind::JsonParseError.is_transient());
    }
}
