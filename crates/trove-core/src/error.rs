//! Store Error Types
//!
//! Errors raised by graph store adapters. The query layer never retries on
//! these; they propagate to the caller unchanged.

use thiserror::Error;

/// Error type for graph store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Read transaction is closed")]
    TransactionClosed,

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Create a generic backend error
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
