//! Adapter error types.

use quotron_core::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limited by provider")]
    RateLimit,

    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("malformed symbol: {0}")]
    Malformed(String),

    #[error("provider returned an unparseable response: {0}")]
    BadResponse(String),
}

impl AdapterError {
    /// Maps to the shared error taxonomy — this is what the gateway's
    /// client-manager inspects to decide whether to fail over.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Network(_) => ErrorKind::Transient,
            AdapterError::RateLimit => ErrorKind::Transient,
            AdapterError::NotFound(_) => ErrorKind::NotFound,
            AdapterError::Malformed(_) => ErrorKind::Input,
            AdapterError::BadResponse(_) => ErrorKind::Transient,
        }
    }

    /// Whether the client-manager should consider failing over to the
    /// other adapter after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient | ErrorKind::Timeout | ErrorKind::Unavailable)
    }
}
