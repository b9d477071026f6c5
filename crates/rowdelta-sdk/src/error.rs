use rowdelta_observe::{ObserveError, SourceError};
use rowdelta_types::TypeError;
use rowdelta_verify::{DeltaAssertionError, VerifyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// The caller used the API incorrectly.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Observe(#[from] ObserveError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

impl SdkError {
    pub fn is_assertion(&self) -> bool {
        self.assertion().is_some()
    }

    pub fn is_invalid_usage(&self) -> bool {
        match self {
            SdkError::InvalidUsage(_) => true,
            SdkError::Observe(e) => e.is_invalid_usage(),
            SdkError::Verify(e) => e.is_invalid_usage(),
            SdkError::Source(SourceError::InvalidQuery(_)) => true,
            _ => false,
        }
    }

    pub fn is_internal(&self) -> bool {
        match self {
            SdkError::Observe(e) => e.is_internal(),
            SdkError::Verify(e) => e.is_internal(),
            _ => false,
        }
    }

    /// The assertion payload, if this is an assertion failure.
    pub fn assertion(&self) -> Option<&DeltaAssertionError> {
        match self {
            SdkError::Observe(e) => e.assertion(),
            SdkError::Verify(e) => e.assertion(),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SdkError {
    fn from(e: toml::de::Error) -> Self {
        SdkError::Config(e.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowdelta_diff::DiffError;

    fn negative_multiplicity() -> VerifyError {
        VerifyError::from(DiffError::NegativeMultiplicity {
            row: "(1)".into(),
            have: 0,
            requested: 1,
        })
    }

    #[test]
    fn internal_through_verify() {
        let err = SdkError::from(negative_multiplicity());
        assert!(err.is_internal());
        assert!(!err.is_assertion());
    }

    #[test]
    fn internal_through_observe() {
        let err = SdkError::from(ObserveError::from(VerifyError::from(DiffError::Unbalanced {
            old: 2,
            new: 0,
            removed: 1,
            added: 0,
        })));
        assert!(err.is_internal());
        assert!(!err.is_invalid_usage());
    }

    #[test]
    fn config_and_io_are_not_internal() {
        assert!(!SdkError::Config("bad".into()).is_internal());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!SdkError::from(io).is_internal());
    }

    #[test]
    fn invalid_query_is_invalid_usage() {
        let err = SdkError::from(SourceError::InvalidQuery("no columns".into()));
        assert!(err.is_invalid_usage());
        assert!(!err.is_internal());
    }
}
