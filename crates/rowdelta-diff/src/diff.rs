//! Snapshot diff: compare two row multisets.
//!
//! For every distinct row `r`:
//!
//! - `removed.count(r) = max(0, old.count(r) - new.count(r))`
//! - `added.count(r)   = max(0, new.count(r) - old.count(r))`
//!
//! An update of a row shows up as the old tuple removed and the new tuple
//! added.

use rowdelta_types::Row;
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::row_set::RowSet;

/// The result of comparing two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSetDiff {
    /// Occurrences present in the old snapshot but not in the new one.
    pub removed: RowSet,
    /// Occurrences present in the new snapshot but not in the old one.
    pub added: RowSet,
}

impl RowSetDiff {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Total number of changed occurrences.
    pub fn len(&self) -> usize {
        self.removed.len() + self.added.len()
    }

    /// Number of removed occurrences.
    pub fn removals(&self) -> usize {
        self.removed.len()
    }

    /// Number of added occurrences.
    pub fn additions(&self) -> usize {
        self.added.len()
    }

    /// Changes as a flat list: removals first, then additions.
    pub fn changes(&self) -> Vec<RowChange> {
        let removed = self.removed.iter().map(|(row, count)| RowChange::Removed {
            row: row.clone(),
            count,
        });
        let added = self.added.iter().map(|(row, count)| RowChange::Added {
            row: row.clone(),
            count,
        });
        removed.chain(added).collect()
    }
}

/// A single change between two snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowChange {
    /// `count` occurrences of `row` disappeared.
    Removed { row: Row, count: usize },
    /// `count` occurrences of `row` appeared.
    Added { row: Row, count: usize },
}

/// Compute the multiset diff between `old` and `new`.
///
/// Runs in `O(|old| + |new|)`. The result is checked against the balance
/// `|removed| - |added| = |old| - |new|`; a mismatch is reported as
/// [`DiffError::Unbalanced`].
pub fn diff_row_sets(old: &RowSet, new: &RowSet) -> DiffResult<RowSetDiff> {
    let mut removed = RowSet::new();
    let mut added = RowSet::new();

    for (row, old_count) in old.iter() {
        let new_count = new.count(row);
        if old_count > new_count {
            removed.add_n(row.clone(), old_count - new_count);
        }
    }

    for (row, new_count) in new.iter() {
        let old_count = old.count(row);
        if new_count > old_count {
            added.add_n(row.clone(), new_count - old_count);
        }
    }

    let balanced = (removed.len() as i128 - added.len() as i128)
        == (old.len() as i128 - new.len() as i128);
    if !balanced {
        return Err(DiffError::Unbalanced {
            old: old.len(),
            new: new.len(),
            removed: removed.len(),
            added: added.len(),
        });
    }

    debug!(
        old = old.len(),
        new = new.len(),
        removed = removed.len(),
        added = added.len(),
        "row sets diffed"
    );

    Ok(RowSetDiff { removed, added })
}
