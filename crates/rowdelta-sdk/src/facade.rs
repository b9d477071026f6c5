//! Free-function shorthand for the common checks.
//!
//! Each assertion takes one checkpoint on the observer, so the baseline
//! moves forward whether or not the assertion passes.

use std::borrow::Borrow;

use rowdelta_observe::{
    Checkpoint, Claims, Conversion, MemoryTable, Observer, SnapshotProvider, TableQuery,
    TypedObserver,
};
use rowdelta_types::DataSet;
use rowdelta_verify::DeltaSummary;
use tracing::debug;

use crate::error::{SdkError, SdkResult};

type ClaimOf<C> = <<C as Checkpoint>::Delta as Claims>::Item;

/// Observe `source`, reading its current contents as the baseline.
pub fn observe<S: SnapshotProvider>(source: S) -> SdkResult<Observer<S>> {
    Ok(Observer::new(source)?)
}

/// Observe `source`, taking `initial` as its current contents.
pub fn observe_with<S: SnapshotProvider>(source: S, initial: &DataSet) -> SdkResult<Observer<S>> {
    Ok(Observer::with_baseline(source, initial)?)
}

pub fn observe_typed<T, S: SnapshotProvider>(
    source: S,
    conversion: Conversion<T>,
) -> SdkResult<TypedObserver<T, S>> {
    Ok(TypedObserver::new(source, conversion)?)
}

/// Changes since the previous checkpoint.
pub fn delta<C: Checkpoint>(observer: &mut C) -> SdkResult<C::Delta> {
    Ok(observer.checkpoint()?)
}

/// Nothing changed.
pub fn assert_no_changes<C: Checkpoint>(observer: &mut C) -> SdkResult<DeltaSummary> {
    Ok(observer.checkpoint()?.end()?)
}

/// Exactly `added` was inserted and nothing else changed.
pub fn assert_inserted<C, I>(observer: &mut C, added: I) -> SdkResult<DeltaSummary>
where
    C: Checkpoint,
    I: IntoIterator,
    I::Item: Borrow<ClaimOf<C>>,
{
    let mut d = observer.checkpoint()?;
    d.after(added)?;
    Ok(d.end()?)
}

/// Exactly `removed` was deleted and nothing else changed.
pub fn assert_deleted<C, I>(observer: &mut C, removed: I) -> SdkResult<DeltaSummary>
where
    C: Checkpoint,
    I: IntoIterator,
    I::Item: Borrow<ClaimOf<C>>,
{
    let mut d = observer.checkpoint()?;
    d.before(removed)?;
    Ok(d.end()?)
}

/// `before` was replaced by `after` and nothing else changed.
pub fn assert_changed<C, A, B>(observer: &mut C, after: A, before: B) -> SdkResult<DeltaSummary>
where
    C: Checkpoint,
    A: IntoIterator,
    A::Item: Borrow<ClaimOf<C>>,
    B: IntoIterator,
    B::Item: Borrow<ClaimOf<C>>,
{
    let mut d = observer.checkpoint()?;
    d.after(after)?.before(before)?;
    Ok(d.end()?)
}

/// Delete every row of `table`. Returns the number deleted.
pub fn delete_all(table: &MemoryTable) -> usize {
    let n = table.delete_all();
    debug!(table = table.name(), rows = n, "deleted all rows");
    n
}

/// Delete the rows of the underlying table that `query` selects.
///
/// Only plain filtered queries qualify: grouped queries, HAVING clauses
/// and unfiltered queries are rejected before anything is touched.
pub fn delete_all_matching(query: &TableQuery<'_>) -> SdkResult<usize> {
    if query.is_grouped() {
        return Err(SdkError::InvalidUsage(
            "cannot delete through a query with GROUP BY".into(),
        ));
    }
    if query.has_having() {
        return Err(SdkError::InvalidUsage(
            "cannot delete through a query with HAVING".into(),
        ));
    }
    if !query.has_filter() {
        return Err(SdkError::InvalidUsage(
            "query has no filter; use delete_all".into(),
        ));
    }
    let table = query.table();
    let n = table.delete_where(|r| query.matches(r));
    debug!(table = table.name(), rows = n, "deleted matching rows");
    Ok(n)
}

/// Remove every row of `table`.
pub fn truncate(table: &MemoryTable) {
    table.truncate();
    debug!(table = table.name(), "truncated");
}

/// Insert `data` into `table`. Returns the number of rows inserted.
pub fn insert_into(table: &MemoryTable, data: &DataSet) -> SdkResult<usize> {
    let n = table.insert(data)?;
    debug!(table = table.name(), rows = n, "inserted rows");
    Ok(n)
}

/// Library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
