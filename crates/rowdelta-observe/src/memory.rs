//! In-memory tables and queries.
//!
//! These stand in for a database in tests and embedded use. A
//! [`MemoryTable`] takes `&self` for writes, so an observer can hold a
//! reference to it while the code under test keeps writing.

use std::cell::RefCell;

use rowdelta_diff::RowSet;
use rowdelta_types::{Column, DataSet, Row, TypeError};

use crate::error::{SourceError, SourceResult};
use crate::source::SnapshotProvider;

type Predicate<'a> = Box<dyn Fn(&Row) -> bool + 'a>;

/// A named, in-memory table.
///
/// Rows are kept in insertion order and duplicates are allowed. Predicates
/// and update functions must not call back into the same table.
pub struct MemoryTable {
    name: String,
    columns: Vec<Column>,
    rows: RefCell<Vec<Row>>,
}

impl MemoryTable {
    /// Create an empty table.
    pub fn new(name: impl Into<String>, columns: impl Into<Vec<Column>>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into(),
            rows: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the column called `name`.
    pub fn column_index(&self, name: &str) -> SourceResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| SourceError::UnknownColumn(format!("{}.{name}", self.name)))
    }

    fn check_arity(&self, row: &Row) -> SourceResult<()> {
        if row.len() != self.columns.len() {
            return Err(TypeError::ArityMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Insert one row.
    pub fn insert_row(&self, row: Row) -> SourceResult<()> {
        self.check_arity(&row)?;
        self.rows.borrow_mut().push(row);
        Ok(())
    }

    /// Insert every row of `data`, in order. Nothing is inserted if any row
    /// has the wrong arity or the data set is bound to other columns.
    pub fn insert(&self, data: &DataSet) -> SourceResult<usize> {
        if let Some(bound) = data.columns() {
            if bound != self.columns.as_slice() {
                return Err(TypeError::ColumnMismatch {
                    expected: self.columns.iter().map(|c| c.name().to_owned()).collect(),
                    actual: bound.iter().map(|c| c.name().to_owned()).collect(),
                }
                .into());
            }
        }
        for row in data {
            self.check_arity(row)?;
        }
        self.rows.borrow_mut().extend(data.iter().cloned());
        Ok(data.len())
    }

    /// Replace every row matching `pred` with `update(row)`. Returns the
    /// number of rows changed.
    pub fn update_where(
        &self,
        pred: impl Fn(&Row) -> bool,
        update: impl Fn(&Row) -> Row,
    ) -> SourceResult<usize> {
        let mut rows = self.rows.borrow_mut();
        let mut staged = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if pred(row) {
                let new_row = update(row);
                self.check_arity(&new_row)?;
                staged.push((i, new_row));
            }
        }
        let changed = staged.len();
        for (i, new_row) in staged {
            rows[i] = new_row;
        }
        Ok(changed)
    }

    /// Delete every row matching `pred`. Returns the number deleted.
    pub fn delete_where(&self, pred: impl Fn(&Row) -> bool) -> usize {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|r| !pred(r));
        before - rows.len()
    }

    /// Delete the first row equal to `row`. Returns `true` if one was found.
    pub fn delete_one(&self, row: &Row) -> bool {
        let mut rows = self.rows.borrow_mut();
        match rows.iter().position(|r| r == row) {
            Some(i) => {
                rows.remove(i);
                true
            }
            None => false,
        }
    }

    /// Delete every row. Returns the number deleted.
    pub fn delete_all(&self) -> usize {
        let mut rows = self.rows.borrow_mut();
        let n = rows.len();
        rows.clear();
        n
    }

    /// Remove every row without counting them.
    pub fn truncate(&self) {
        self.rows.borrow_mut().clear();
    }

    /// Copy of the current rows, in insertion order.
    pub fn rows(&self) -> Vec<Row> {
        self.rows.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    /// Start a query over this table.
    pub fn select(&self) -> TableQuery<'_> {
        TableQuery::new(self)
    }
}

impl SnapshotProvider for MemoryTable {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn query(&self) -> SourceResult<RowSet> {
        Ok(self.rows.borrow().iter().cloned().collect())
    }
}

impl std::fmt::Debug for MemoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTable")
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("row_count", &self.len())
            .finish()
    }
}

/// A query over a [`MemoryTable`].
///
/// Supports a row filter (WHERE), grouping onto a subset of columns
/// (GROUP BY, yielding one row per distinct group) and a filter over the
/// grouped rows (HAVING). Grouped queries can be observed like any other
/// source but cannot drive a bulk delete.
pub struct TableQuery<'t> {
    table: &'t MemoryTable,
    filter: Option<Predicate<'t>>,
    group_by: Vec<usize>,
    having: Option<Predicate<'t>>,
    columns: Vec<Column>,
}

impl<'t> TableQuery<'t> {
    /// Select every row of `table`.
    pub fn new(table: &'t MemoryTable) -> Self {
        Self {
            table,
            filter: None,
            group_by: Vec::new(),
            having: None,
            columns: table.columns.clone(),
        }
    }

    /// Keep only rows matching `pred`.
    pub fn filter(mut self, pred: impl Fn(&Row) -> bool + 't) -> Self {
        self.filter = Some(Box::new(pred));
        self
    }

    /// Group by the named columns; the query then yields one row per group,
    /// holding only the grouping columns. At least one column is required.
    pub fn group_by(mut self, names: &[&str]) -> SourceResult<Self> {
        if names.is_empty() {
            return Err(SourceError::InvalidQuery(format!(
                "GROUP BY on {} names no columns",
                self.table.name
            )));
        }
        let positions = names
            .iter()
            .map(|n| self.table.column_index(n))
            .collect::<SourceResult<Vec<_>>>()?;
        self.columns = positions
            .iter()
            .map(|&i| self.table.columns[i].clone())
            .collect();
        self.group_by = positions;
        Ok(self)
    }

    /// Keep only groups matching `pred`, evaluated on grouped rows. Without
    /// a GROUP BY it is applied to the filtered rows, after `filter`.
    pub fn having(mut self, pred: impl Fn(&Row) -> bool + 't) -> Self {
        self.having = Some(Box::new(pred));
        self
    }

    pub fn table(&self) -> &'t MemoryTable {
        self.table
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn has_having(&self) -> bool {
        self.having.is_some()
    }

    /// Returns `true` if a table row passes the row filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filter.as_ref().map_or(true, |f| f(row))
    }
}

impl SnapshotProvider for TableQuery<'_> {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn query(&self) -> SourceResult<RowSet> {
        let rows = self.table.rows.borrow();
        let selected = rows.iter().filter(|r| self.matches(*r));
        if self.group_by.is_empty() {
            return Ok(match &self.having {
                Some(having) => selected.filter(|r| having(*r)).cloned().collect(),
                None => selected.cloned().collect(),
            });
        }

        let mut groups = RowSet::new();
        for row in selected {
            let key = row.project(&self.group_by);
            if !groups.contains(&key) {
                groups.add(key);
            }
        }
        match &self.having {
            Some(having) => Ok(groups.rows().filter(|r| having(*r)).cloned().collect()),
            None => Ok(groups),
        }
    }
}

impl std::fmt::Debug for TableQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableQuery")
            .field("table", &self.table.name)
            .field("filtered", &self.has_filter())
            .field("group_by", &self.group_by)
            .field("having", &self.has_having())
            .finish()
    }
}
