//! Stable tool-name derivation (spec §4.3.1).

use sha2::{Digest, Sha256};

/// `GenerateStable(method, routeTemplate)`: a pure function producing the
/// same output for the same inputs across runs (spec §8 property 6).
pub fn generate_stable(method: &str, route_template: &str) -> String {
    let method = if method.trim().is_empty() {
        "GET".to_string()
    } else {
        method.to_uppercase()
    };
    let route = normalize_route(route_template);
    format!("{method}_{route}")
}

/// Strip leading/trailing `/`; collapse `{name:constraint}` to `{name}`;
/// replace `{`/`}` with `_`; collapse runs of `_`; replace any character
/// outside `[A-Za-z0-9_-]` with `_`; trim trailing `_`; `unknown` if empty.
fn normalize_route(route: &str) -> String {
    let trimmed = route.trim_matches('/');

    let mut collapsed_constraints = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' {
            let mut name = String::new();
            let mut in_constraint = false;
            for next in chars.by_ref() {
                if next == '}' {
                    break;
                }
                if next == ':' {
                    in_constraint = true;
                    continue;
                }
                if !in_constraint {
                    name.push(next);
                }
            }
            collapsed_constraints.push('{');
            collapsed_constraints.push_str(&name);
            collapsed_constraints.push('}');
        } else {
            collapsed_constraints.push(c);
        }
    }

    let braces_replaced: String = collapsed_constraints
        .chars()
        .map(|c| if c == '{' || c == '}' { '_' } else { c })
        .collect();

    let charset_replaced: String = braces_replaced
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut result = String::with_capacity(charset_replaced.len());
    let mut last_was_underscore = false;
    for c in charset_replaced.chars() {
        if c == '_' {
            if !last_was_underscore {
                result.push(c);
            }
            last_was_underscore = true;
        } else {
            result.push(c);
            last_was_underscore = false;
        }
    }

    let trimmed_result = result.trim_end_matches('_');
    if trimmed_result.is_empty() {
        "unknown".to_string()
    } else {
        trimmed_result.to_string()
    }
}

/// Stable 8-hex-character suffix derived from SHA-256 of
/// `"{METHOD}:{routeTemplate}"`, appended on duplicate tool names
/// (spec §4.3).
pub fn duplicate_suffix(method: &str, route_template: &str) -> String {
    let key = format!("{}:{}", method.to_uppercase(), route_template);
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_route() {
        assert_eq!(generate_stable("get", "/api/foo"), "GET_api_foo");
    }

    #[test]
    fn blank_method_defaults_to_get() {
        assert_eq!(generate_stable("", "/api/foo"), "GET_api_foo");
    }

    #[test]
    fn collapses_constrained_placeholder() {
        assert_eq!(
            generate_stable("GET", "/api/tools/{id:guid}"),
            "GET_api_tools_id"
        );
    }

    #[test]
    fn collapses_double_slash() {
        // "GET /api/foo" and "GET /api//foo/" both normalise to the same
        // base name (spec §8 S4).
        assert_eq!(generate_stable("GET", "/api/foo"), generate_stable("GET", "/api//foo/"));
    }

    #[test]
    fn empty_route_becomes_unknown() {
        assert_eq!(generate_stable("GET", "/"), "GET_unknown");
    }

    #[test]
    fn special_characters_become_underscores() {
        assert_eq!(generate_stable("GET", "/api/foo bar!"), "GET_api_foo_bar");
    }

    #[test]
    fn pure_function_same_inputs_same_output() {
        let a = generate_stable("post", "/api/{x}/y");
        let b = generate_stable("post", "/api/{x}/y");
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_suffix_is_deterministic_and_8_hex_chars() {
        let s1 = duplicate_suffix("GET", "/api/foo");
        let s2 = duplicate_suffix("GET", "/api/foo");
        assert_eq!(s1, s2);
        assert_eq!(s1.len(), 8);
        assert!(s1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn duplicate_suffix_differs_for_different_routes() {
        assert_ne!(
            duplicate_suffix("GET", "/api/foo"),
            duplicate_suffix("GET", "/api/bar")
        );
    }
}
