//! Bus error types.

use quotron_core::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("message parse error: {0}")]
    Parse(String),

    #[error("acknowledge error: {0}")]
    Ack(String),

    #[error("timeout after {0}ms")]
    Timeout(u64),

    #[error("stream not found: {0}")]
    NotFound(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl BusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BusError::Connection(_) | BusError::Provider(_) | BusError::Ack(_) => {
                ErrorKind::Transient
            }
            BusError::Parse(_) => ErrorKind::Permanent,
            BusError::Timeout(_) => ErrorKind::Timeout,
            BusError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl From<redis::RedisError> for BusError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_timeout() {
            BusError::Timeout(0)
        } else if e.is_connection_dropped() || e.is_connection_refusal() {
            BusError::Connection(e.to_string())
        } else {
            BusError::Provider(e.to_string())
        }
    }
}
