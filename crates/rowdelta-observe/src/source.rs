use std::sync::Arc;

use rowdelta_diff::RowSet;
use rowdelta_types::{Column, Row, TypeError};

use crate::error::{SourceError, SourceResult};

/// A readable data source: a table, a query, or anything producing rows.
///
/// Implementations must satisfy these rules:
/// - `query()` performs a fresh read on every call; nothing is cached.
/// - Every returned row has one value per column in `columns()`.
/// - Failures are returned, never retried or swallowed.
pub trait SnapshotProvider {
    /// Column descriptors, in row order.
    fn columns(&self) -> &[Column];

    /// Read the current rows.
    fn query(&self) -> SourceResult<RowSet>;
}

impl<S: SnapshotProvider + ?Sized> SnapshotProvider for &S {
    fn columns(&self) -> &[Column] {
        (**self).columns()
    }

    fn query(&self) -> SourceResult<RowSet> {
        (**self).query()
    }
}

impl<S: SnapshotProvider + ?Sized> SnapshotProvider for Box<S> {
    fn columns(&self) -> &[Column] {
        (**self).columns()
    }

    fn query(&self) -> SourceResult<RowSet> {
        (**self).query()
    }
}

impl<S: SnapshotProvider + ?Sized> SnapshotProvider for Arc<S> {
    fn columns(&self) -> &[Column] {
        (**self).columns()
    }

    fn query(&self) -> SourceResult<RowSet> {
        (**self).query()
    }
}

/// A provider backed by a caller closure.
///
/// This is how a custom query plugs in: the closure runs the read (binding
/// whatever arguments it captured) and returns rows or an error, which is
/// propagated as [`SourceError::Query`] with the cause preserved.
pub struct FnSource<F> {
    columns: Vec<Column>,
    read: F,
}

impl<F> FnSource<F> {
    pub fn new(columns: impl Into<Vec<Column>>, read: F) -> Self {
        Self {
            columns: columns.into(),
            read,
        }
    }
}

impl<F, E> SnapshotProvider for FnSource<F>
where
    F: Fn() -> Result<Vec<Row>, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn query(&self) -> SourceResult<RowSet> {
        let rows = (self.read)().map_err(SourceError::query)?;
        if let Some(bad) = rows.iter().find(|r| r.len() != self.columns.len()) {
            return Err(TypeError::ArityMismatch {
                expected: self.columns.len(),
                actual: bad.len(),
            }
            .into());
        }
        Ok(rows.into_iter().collect())
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}
