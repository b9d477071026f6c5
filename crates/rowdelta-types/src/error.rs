use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("row arity mismatch: expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("column mismatch: expected {expected:?}, got {actual:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("unexpected value at position {position}: expected {expected}, got {actual}")]
    UnexpectedValue {
        position: usize,
        expected: &'static str,
        actual: String,
    },

    #[error("unsupported JSON value: {0}")]
    UnsupportedJson(String),

    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
