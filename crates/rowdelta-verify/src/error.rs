//! Error types for the verify crate.

use rowdelta_diff::DiffError;
use rowdelta_types::TypeError;
use thiserror::Error;

use crate::report::MismatchReport;

/// A delta check failed: claims and actual changes disagree.
///
/// Carries the full [`MismatchReport`]; its `Display` lists every mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{report}")]
pub struct DeltaAssertionError {
    report: MismatchReport,
}

impl DeltaAssertionError {
    pub fn new(report: MismatchReport) -> Self {
        Self { report }
    }

    /// The mismatch payload.
    pub fn report(&self) -> &MismatchReport {
        &self.report
    }

    pub fn into_report(self) -> MismatchReport {
        self.report
    }
}

/// Errors from delta verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The caller used the API incorrectly; nothing was checked.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    /// Claims did not match the actual changes.
    #[error(transparent)]
    Assertion(#[from] DeltaAssertionError),

    /// The engine broke one of its own invariants.
    #[error("internal error: {0}")]
    Internal(#[from] DiffError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

impl VerifyError {
    pub fn is_assertion(&self) -> bool {
        matches!(self, VerifyError::Assertion(_))
    }

    pub fn is_invalid_usage(&self) -> bool {
        matches!(self, VerifyError::InvalidUsage(_))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, VerifyError::Internal(_))
    }

    /// The assertion payload, if this is an assertion failure.
    pub fn assertion(&self) -> Option<&DeltaAssertionError> {
        match self {
            VerifyError::Assertion(e) => Some(e),
            _ => None,
        }
    }
}

/// Result alias for verification.
pub type VerifyResult<T> = Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn unbalanced() -> DiffError {
        DiffError::Unbalanced {
            old: 3,
            new: 2,
            removed: 2,
            added: 0,
        }
    }

    #[test]
    fn diff_failures_are_internal() {
        let err = VerifyError::from(unbalanced());
        assert!(err.is_internal());
        assert!(!err.is_assertion());
        assert!(!err.is_invalid_usage());
        assert!(err.to_string().starts_with("internal error: unbalanced diff"));
    }

    #[test]
    fn each_kind_has_exactly_one_flag() {
        let usage = VerifyError::InvalidUsage("end() called twice".into());
        assert!(usage.is_invalid_usage() && !usage.is_internal() && !usage.is_assertion());

        let assertion = VerifyError::from(DeltaAssertionError::new(MismatchReport::default()));
        assert!(assertion.is_assertion() && !assertion.is_internal());
        assert!(assertion.assertion().is_some());

        let ty = VerifyError::from(TypeError::ArityMismatch { expected: 2, actual: 1 });
        assert!(!ty.is_internal() && !ty.is_invalid_usage() && !ty.is_assertion());
    }
}
