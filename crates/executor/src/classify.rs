//! Response classification (spec §4.6 step 8): turn a raw HTTP response
//! into structured content plus a human-readable summary.

use serde_json::Value;

const SUMMARY_ARRAY_TRUNCATE: usize = 10;

#[derive(Debug, Clone)]
pub struct ClassifiedResponse {
    pub status: u16,
    pub is_transient: bool,
    pub is_error: bool,
    pub json: Option<Value>,
    pub text: String,
    pub content_type: String,
}

/// `isTransient iff status >= 500 || status in {408, 429}` (spec §4.6 step 8).
pub fn is_transient_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}

pub fn classify(status: u16, content_type: &str, body: &[u8]) -> ClassifiedResponse {
    let is_error = !(200..300).contains(&status);
    let is_transient = is_error && is_transient_status(status);

    if content_type.contains("json") {
        match serde_json::from_slice::<Value>(body) {
            Ok(json) => {
                let summary = summarize(&json);
                return ClassifiedResponse {
                    status,
                    is_transient,
                    is_error,
                    json: Some(json),
                    text: summary,
                    content_type: content_type.to_string(),
                };
            }
            Err(_) => {
                return ClassifiedResponse {
                    status,
                    is_transient,
                    is_error,
                    json: None,
                    text: String::from_utf8_lossy(body).into_owned(),
                    content_type: content_type.to_string(),
                };
            }
        }
    }

    ClassifiedResponse {
        status,
        is_transient,
        is_error,
        json: None,
        text: String::from_utf8_lossy(body).into_owned(),
        content_type: content_type.to_string(),
    }
}

/// Objects render as `k: v, …`; arrays as `[v1, v2, …]` truncated at 10
/// items (spec §4.6 step 8).
fn summarize(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", scalar_or_json(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => {
            let truncated = items.len() > SUMMARY_ARRAY_TRUNCATE;
            let rendered = items
                .iter()
                .take(SUMMARY_ARRAY_TRUNCATE)
                .map(scalar_or_json)
                .collect::<Vec<_>>()
                .join(", ");
            if truncated {
                format!("[{rendered}, …]")
            } else {
                format!("[{rendered}]")
            }
        }
        other => scalar_or_json(other),
    }
}

fn scalar_or_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
