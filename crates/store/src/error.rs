//! Store error types.

use quotron_core::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("no rows found")]
    NotFound,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Database(_) => ErrorKind::Unavailable,
            StoreError::NotFound => ErrorKind::NotFound,
        }
    }
}
