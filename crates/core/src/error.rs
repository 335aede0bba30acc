use thiserror::Error;

/// The error-kind taxonomy shared across every crate boundary (spec §7).
///
/// Each local error type in a downstream crate (`AdapterError`, `BusError`,
/// `StoreError`, ...) implements `kind() -> ErrorKind` so boundary code (the
/// gateway's HTTP layer, the ETL worker's ack/nack decision, the scheduler's
/// per-symbol skip) can react without re-deriving the classification from a
/// string message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: bad symbol, empty batch, out-of-range parameter.
    Input,
    /// Upstream reported "unknown symbol", or a store query returned nothing.
    NotFound,
    /// A required dependency (store, health collector) is absent.
    Unavailable,
    /// A deadline was exceeded at some layer.
    Timeout,
    /// A retryable failure: network blip, 5xx, rate limit, bus/store hiccup.
    Transient,
    /// A validation failure that will never succeed on retry.
    Permanent,
    /// An unexpected condition outside the above categories.
    Internal,
}

/// Top-level error type for code that spans crate boundaries (e.g. the
/// supervisor, which touches config, process, and bus errors together).
#[derive(Debug, Error)]
pub enum QuotronError {
    #[error("input error: {0}")]
    Input(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("transient error: {0}")]
    Transient(String),

    #[error("permanent validation failure: {0}")]
    Permanent(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuotronError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuotronError::Input(_) => ErrorKind::Input,
            QuotronError::NotFound(_) => ErrorKind::NotFound,
            QuotronError::Unavailable(_) => ErrorKind::Unavailable,
            QuotronError::Timeout(_) => ErrorKind::Timeout,
            QuotronError::Transient(_) => ErrorKind::Transient,
            QuotronError::Permanent(_) => ErrorKind::Permanent,
            QuotronError::Internal(_) | QuotronError::Io(_) => ErrorKind::Internal,
        }
    }
}
