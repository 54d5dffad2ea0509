//! URI template expansion (spec §4.6 step 2-3).

use std::collections::BTreeSet;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::{Map, Value};

use crate::convert::value_to_uri_string;

/// Everything outside the unreserved set (spec §8 "Route parameter with
/// special chars → percent-encoded"), so a substituted path segment can't
/// smuggle in a `/`, `&`, `?`, or space.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'&')
    .add(b'=')
    .add(b'+');

/// Result of expanding a route template against a set of call arguments.
pub struct ExpandedUri {
    pub path: String,
    /// Argument keys consumed by a `{placeholder}` — excluded from the
    /// later query-string pass.
    pub consumed: BTreeSet<String>,
}

/// Substitutes every `{name}` placeholder in `route_template` with the
/// case-insensitively matching argument, percent-encoding the value.
/// Unmatched placeholders are left in place verbatim.
pub fn expand_template(route_template: &str, arguments: &Map<String, Value>) -> ExpandedUri {
    let mut path = String::with_capacity(route_template.len());
    let mut consumed = BTreeSet::new();
    let bytes = route_template.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = route_template[i..].find('}') {
                let placeholder = &route_template[i + 1..i + end];
                match find_argument(arguments, placeholder) {
                    Some((key, value)) => {
                        consumed.insert(key);
                        path.push_str(&percent_encode_path(&value_to_uri_string(value)));
                    }
                    None => path.push_str(&route_template[i..i + end + 1]),
                }
                i += end + 1;
                continue;
            }
        }
        let ch = route_template[i..].chars().next().unwrap();
        path.push(ch);
        i += ch.len_utf8();
    }

    ExpandedUri { path, consumed }
}

fn find_argument<'a>(arguments: &'a Map<String, Value>, placeholder: &str) -> Option<(String, &'a Value)> {
    arguments
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(placeholder))
        .map(|(k, v)| (k.clone(), v))
}

/// True percent-encoding for a substituted path segment (spec §8: a route
/// parameter must not let `/`, `&`, `?`, or a space through unescaped).
fn percent_encode_path(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Builds the `key=value&...` query string from arguments not consumed by
/// the route and not named `body` (spec §4.6 step 3). Query values use
/// `application/x-www-form-urlencoded` semantics (space → `+`), matching
/// how the values will actually be read back on the wire.
pub fn build_query_string(arguments: &Map<String, Value>, consumed: &BTreeSet<String>) -> String {
    arguments
        .iter()
        .filter(|(k, _)| k.as_str() != "body" && !consumed.contains(k.as_str()))
        .map(|(k, v)| {
            let key: String = url::form_urlencoded::byte_serialize(k.as_bytes()).collect();
            let value: String =
                url::form_urlencoded::byte_serialize(value_to_uri_string(v).as_bytes()).collect();
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn substitutes_case_insensitively() {
        let arguments = args(&[("ID", json!(42))]);
        let expanded = expand_template("/users/{id}", &arguments);
        assert_eq!(expanded.path, "/users/42");
        assert!(expanded.consumed.contains("ID"));
    }

    #[test]
    fn leaves_unmatched_placeholder_in_place() {
        let arguments = Map::new();
        let expanded = expand_template("/users/{id}", &arguments);
        assert_eq!(expanded.path, "/users/{id}");
        assert!(expanded.consumed.is_empty());
    }

    #[test]
    fn percent_encodes_substituted_value() {
        let arguments = args(&[("name", json!("a b"))]);
        let expanded = expand_template("/search/{name}", &arguments);
        assert_eq!(expanded.path, "/search/a%20b");
    }

    #[test]
    fn percent_encodes_path_separators_and_query_chars() {
        let arguments = args(&[("id", json!("a/b&c?d"))]);
        let expanded = expand_template("/items/{id}", &arguments);
        assert_eq!(expanded.path, "/items/a%2Fb%26c%3Fd");
    }

    #[test]
    fn query_string_excludes_consumed_and_body() {
        let arguments = args(&[
            ("id", json!(1)),
            ("filter", json!("active")),
            ("body", json!({"x": 1})),
        ]);
        let expanded = expand_template("/items/{id}", &arguments);
        let qs = build_query_string(&arguments, &expanded.consumed);
        assert_eq!(qs, "filter=active");
    }
}
