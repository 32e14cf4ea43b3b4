//! Error types for field resolution.
//!
//! Three families matter to callers:
//! - invalid arguments, always detected before a transaction opens
//! - store failures, propagated verbatim and never retried here
//! - unsupported fields, a resolver wiring defect rather than bad input

use crate::search::SearchError;
use thiserror::Error;
use trove_core::StoreError;

/// Errors raised while resolving a field
#[derive(Debug, Error)]
pub enum QueryError {
    /// Malformed or out-of-range filter, paging or node argument
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// The graph store failed; passed through unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A shared resolver was asked for a field it does not know
    #[error("Resolver '{resolver}' does not support field '{field}'")]
    UnsupportedField { resolver: String, field: String },

    /// No endpoint registered under this name
    #[error("Unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    /// The endpoint has no field with this name
    #[error("Field '{field}' is not defined on endpoint '{endpoint}'")]
    UnknownField { endpoint: String, field: String },

    /// The search collaborator failed
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    /// A resolved value could not be turned into a response value
    #[error("Failed to serialize field output: {0}")]
    Serialization(String),
}

/// Result type for field resolution
pub type QueryResult<T> = Result<T, QueryError>;

/// Coarse classification used in response error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    StoreFailure,
    UnsupportedField,
    Internal,
}

impl QueryError {
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_field(resolver: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnsupportedField {
            resolver: resolver.into(),
            field: field.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Store(_) | Self::Search(_) => ErrorKind::StoreFailure,
            Self::UnsupportedField { .. } | Self::UnknownField { .. } => {
                ErrorKind::UnsupportedField
            }
            Self::UnknownEndpoint(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Stable code reported in `extensions.code` of a field error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Store(_) => "STORE_FAILURE",
            Self::UnsupportedField { .. } => "UNSUPPORTED_FIELD",
            Self::UnknownEndpoint(_) => "UNKNOWN_ENDPOINT",
            Self::UnknownField { .. } => "UNKNOWN_FIELD",
            Self::Search(_) => "SEARCH_FAILURE",
            Self::Serialization(_) => "INTERNAL",
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_is_transparent() {
        let err: QueryError = StoreError::backend("disk on fire").into();
        assert_eq!(err.to_string(), "Storage backend error: disk on fire");
        assert_eq!(err.kind(), ErrorKind::StoreFailure);
        assert!(matches!(err, QueryError::Store(StoreError::Backend(_))));
    }

    #[test]
    fn test_unsupported_field_is_not_invalid_argument() {
        let err = QueryError::unsupported_field("node", "period");
        assert_eq!(err.kind(), ErrorKind::UnsupportedField);
        assert!(!err.is_invalid_argument());
        assert_eq!(err.code(), "UNSUPPORTED_FIELD");
    }
}
