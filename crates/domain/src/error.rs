/// Shared error taxonomy used across the gateway crates (spec §7).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Caller-supplied structure violates a documented precondition
    /// (null descriptor, invalid URL, non-positive numeric limit).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Policy or gateway config fails validation.
    #[error("configuration: {0}")]
    Configuration(String),

    /// Upstream connect/read failure. Transient.
    #[error("transport: {0}")]
    Transport(String),

    /// Deadline elapsed without caller cancellation. Transient.
    #[error("timeout")]
    Timeout,

    /// Caller cancelled. Transient from the executor's perspective.
    #[error("cancelled")]
    Cancelled,

    /// Malformed JSON-RPC or unknown method.
    #[error("protocol: {0}")]
    Protocol(String),

    /// Upstream returned non-success HTTP.
    #[error("execution: {0}")]
    Execution(String),

    /// Unexpected condition; wrapped with a correlation id at the dispatcher.
    #[error("internal: {0}")]
    Internal(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether retrying the same operation might succeed (spec §7 taxonomy).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Timeout | Error::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
