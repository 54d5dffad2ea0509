//! Caller-supplied credentials to propagate onto an outbound tool call
//! (spec §4.6 step 5).

/// Credentials presented by the caller of `tools/call`, if any.
#[derive(Debug, Clone)]
pub enum AuthContext {
    BearerToken(String),
    Cookies(Vec<(String, String)>),
}

impl AuthContext {
    pub fn bearer_header(&self) -> Option<String> {
        match self {
            Self::BearerToken(token) => Some(format!("Bearer {token}")),
            Self::Cookies(_) => None,
        }
    }

    pub fn cookie_header(&self) -> Option<String> {
        match self {
            Self::Cookies(pairs) => Some(
                pairs
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Self::BearerToken(_) => None,
        }
    }
}
