//! Error types for the observe crate.

use rowdelta_types::TypeError;
use rowdelta_verify::{DeltaAssertionError, VerifyError};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures reported by a [`SnapshotProvider`](crate::SnapshotProvider).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The underlying read failed. The cause is kept as the error source.
    #[error("query failed: {0}")]
    Query(#[source] BoxError),

    /// A column name did not resolve against the table.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// The query clauses do not form a valid query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The source returned or was given a malformed row.
    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

impl SourceError {
    /// Wrap a collaborator failure, preserving it as the cause.
    pub fn query(cause: impl Into<BoxError>) -> Self {
        SourceError::Query(cause.into())
    }
}

/// Result alias for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors from observers and typed deltas.
#[derive(Debug, Error)]
pub enum ObserveError {
    /// The caller used the API incorrectly; the source was not touched.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

impl ObserveError {
    pub fn is_assertion(&self) -> bool {
        matches!(self, ObserveError::Verify(e) if e.is_assertion())
    }

    pub fn is_invalid_usage(&self) -> bool {
        match self {
            ObserveError::InvalidUsage(_) => true,
            ObserveError::Verify(e) => e.is_invalid_usage(),
            ObserveError::Source(SourceError::InvalidQuery(_)) => true,
            _ => false,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ObserveError::Verify(e) if e.is_internal())
    }

    /// The assertion payload, if this is an assertion failure.
    pub fn assertion(&self) -> Option<&DeltaAssertionError> {
        match self {
            ObserveError::Verify(e) => e.assertion(),
            _ => None,
        }
    }
}

/// Result alias for observer operations.
pub type ObserveResult<T> = Result<T, ObserveError>;
