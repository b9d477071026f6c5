//! Duplicate-aware row collections.

use std::collections::HashMap;
use std::fmt;

use rowdelta_types::{DataSet, Row};

use crate::error::{DiffError, DiffResult};

/// A multiset of rows.
///
/// Rows are bucketed by their cached fingerprint; rows sharing a bucket are
/// told apart by full equality, so a fingerprint collision never merges two
/// distinct rows. Each distinct row carries an occurrence count.
///
/// Iteration follows first-insertion order, which keeps diagnostics
/// reproducible. Nothing in the diff depends on that order.
#[derive(Clone, Default)]
pub struct RowSet {
    entries: Vec<Entry>,
    buckets: HashMap<u64, Vec<usize>>,
    total: usize,
    distinct: usize,
}

#[derive(Clone)]
struct Entry {
    row: Row,
    count: usize,
}

impl RowSet {
    /// Create an empty row set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `row`.
    pub fn add(&mut self, row: Row) {
        self.add_n(row, 1);
    }

    /// Add `n` occurrences of `row`.
    pub fn add_n(&mut self, row: Row, n: usize) {
        if n == 0 {
            return;
        }
        match self.find(&row) {
            Some(idx) => {
                let entry = &mut self.entries[idx];
                if entry.count == 0 {
                    self.distinct += 1;
                }
                entry.count += n;
            }
            None => {
                let idx = self.entries.len();
                self.buckets.entry(row.fingerprint()).or_default().push(idx);
                self.entries.push(Entry { row, count: n });
                self.distinct += 1;
            }
        }
        self.total += n;
    }

    /// Remove `n` occurrences of `row`.
    ///
    /// Fails with [`DiffError::NegativeMultiplicity`] if fewer than `n` are
    /// present; the set is left untouched in that case.
    pub fn remove_n(&mut self, row: &Row, n: usize) -> DiffResult<()> {
        if n == 0 {
            return Ok(());
        }
        let idx = self.find(row);
        let have = idx.map_or(0, |i| self.entries[i].count);
        match idx {
            Some(i) if have >= n => {
                self.entries[i].count -= n;
                if self.entries[i].count == 0 {
                    self.distinct -= 1;
                }
                self.total -= n;
                Ok(())
            }
            _ => Err(DiffError::NegativeMultiplicity {
                row: row.to_string(),
                have,
                requested: n,
            }),
        }
    }

    /// Consume one occurrence of `row` if any is left.
    ///
    /// Returns `Ok(false)` when the row is absent.
    pub fn take_one(&mut self, row: &Row) -> DiffResult<bool> {
        if self.count(row) == 0 {
            return Ok(false);
        }
        self.remove_n(row, 1)?;
        Ok(true)
    }

    /// Multiplicity of `row` (zero when absent).
    pub fn count(&self, row: &Row) -> usize {
        self.find(row).map_or(0, |i| self.entries[i].count)
    }

    /// Returns `true` if at least one occurrence of `row` is present.
    pub fn contains(&self, row: &Row) -> bool {
        self.count(row) > 0
    }

    /// Total number of occurrences.
    pub fn len(&self) -> usize {
        self.total
    }

    /// Number of distinct rows with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.distinct
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Distinct rows with their counts, in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Row, usize)> + '_ {
        self.entries
            .iter()
            .filter(|e| e.count > 0)
            .map(|e| (&e.row, e.count))
    }

    /// Every occurrence, each row repeated by its multiplicity.
    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.iter()
            .flat_map(|(row, count)| std::iter::repeat(row).take(count))
    }

    /// Owned copy of every occurrence, in iteration order.
    pub fn to_vec(&self) -> Vec<Row> {
        self.rows().cloned().collect()
    }

    fn find(&self, row: &Row) -> Option<usize> {
        self.buckets
            .get(&row.fingerprint())?
            .iter()
            .copied()
            .find(|&i| self.entries[i].row == *row)
    }
}

impl PartialEq for RowSet {
    fn eq(&self, other: &Self) -> bool {
        self.total == other.total
            && self.distinct == other.distinct
            && self.iter().all(|(row, count)| other.count(row) == count)
    }
}

impl Eq for RowSet {}

impl fmt::Debug for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(row, count)| (row.to_string(), count)))
            .finish()
    }
}

impl FromIterator<Row> for RowSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        let mut set = RowSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Row> for RowSet {
    fn extend<I: IntoIterator<Item = Row>>(&mut self, iter: I) {
        for row in iter {
            self.add(row);
        }
    }
}

impl From<&DataSet> for RowSet {
    fn from(data: &DataSet) -> Self {
        data.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowdelta_types::row;

    #[test]
    fn counts_duplicates() {
        let set: RowSet = vec![row!["x", 9], row!["x", 9], row!["y", 1]]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.distinct(), 2);
        assert_eq!(set.count(&row!["x", 9]), 2);
        assert_eq!(set.count(&row!["z", 0]), 0);
    }

    #[test]
    fn take_one_consumes_single_occurrence() {
        let mut set: RowSet = vec![row!["x", 9], row!["x", 9]].into_iter().collect();
        assert!(set.take_one(&row!["x", 9]).unwrap());
        assert_eq!(set.count(&row!["x", 9]), 1);
        assert!(set.take_one(&row!["x", 9]).unwrap());
        assert!(!set.take_one(&row!["x", 9]).unwrap());
        assert!(set.is_empty());
        assert_eq!(set.distinct(), 0);
    }

    #[test]
    fn remove_n_never_goes_negative() {
        let mut set: RowSet = vec![row![1]].into_iter().collect();
        let err = set.remove_n(&row![1], 2).unwrap_err();
        assert!(matches!(
            err,
            DiffError::NegativeMultiplicity { have: 1, requested: 2, .. }
        ));
        assert_eq!(set.count(&row![1]), 1);
    }

    #[test]
    fn readding_after_exhaustion_revives_entry() {
        let mut set = RowSet::new();
        set.add(row!["a"]);
        set.take_one(&row!["a"]).unwrap();
        set.add(row!["a"]);
        assert_eq!(set.distinct(), 1);
        assert_eq!(set.count(&row!["a"]), 1);
    }

    #[test]
    fn iteration_is_insertion_ordered() {
        let set: RowSet = vec![row!["b"], row!["a"], row!["b"], row!["c"]]
            .into_iter()
            .collect();
        let order: Vec<String> = set.iter().map(|(r, _)| r.to_string()).collect();
        assert_eq!(order, vec!["[\"b\"]", "[\"a\"]", "[\"c\"]"]);
        assert_eq!(set.rows().count(), 4);
    }

    #[test]
    fn equality_ignores_order() {
        let a: RowSet = vec![row![1], row![2], row![2]].into_iter().collect();
        let b: RowSet = vec![row![2], row![1], row![2]].into_iter().collect();
        let c: RowSet = vec![row![1], row![2]].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn from_data_set() {
        let ds = DataSet::from_rows(vec![row!["a"], row!["a"]]);
        let set = RowSet::from(&ds);
        assert_eq!(set.count(&row!["a"]), 2);
    }
}
