//! Error types for the diff crate.

/// Invariant violations inside the diff engine.
///
/// These never describe a caller mistake. Seeing one means the engine
/// itself is broken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// Removed/added totals do not balance against the snapshot sizes.
    #[error(
        "unbalanced diff: old={old} new={new} removed={removed} added={added}"
    )]
    Unbalanced {
        old: usize,
        new: usize,
        removed: usize,
        added: usize,
    },

    /// A multiplicity would have dropped below zero.
    #[error("negative multiplicity for {row}: have {have}, removing {requested}")]
    NegativeMultiplicity {
        row: String,
        have: usize,
        requested: usize,
    },

    /// Any other broken internal invariant.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
