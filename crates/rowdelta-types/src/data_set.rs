//! Caller-specified, ordered collections of rows.

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::error::{TypeError, TypeResult};
use crate::row::Row;

/// An ordered collection of rows, optionally bound to a column list.
///
/// Data sets are what tests hand to the engine: expected removals and
/// additions, or the rows a table was just seeded with. Entries keep their
/// declared order and duplicates are kept as separate entries. When bound to
/// columns, every row must have one value per column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DataSetRepr")]
pub struct DataSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<Column>>,
    rows: Vec<Row>,
}

/// Wire form of [`DataSet`]; rows are re-checked against the binding.
#[derive(Deserialize)]
struct DataSetRepr {
    #[serde(default)]
    columns: Option<Vec<Column>>,
    rows: Vec<Row>,
}

impl TryFrom<DataSetRepr> for DataSet {
    type Error = TypeError;

    fn try_from(repr: DataSetRepr) -> TypeResult<Self> {
        let mut data = DataSet {
            columns: repr.columns,
            rows: Vec::with_capacity(repr.rows.len()),
        };
        for row in repr.rows {
            data.push(row)?;
        }
        Ok(data)
    }
}

impl DataSet {
    /// An empty data set not bound to any columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty data set bound to `columns`.
    pub fn for_columns(columns: impl Into<Vec<Column>>) -> Self {
        Self {
            columns: Some(columns.into()),
            rows: Vec::new(),
        }
    }

    /// An unbound data set holding `rows` in iteration order.
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            columns: None,
            rows: rows.into_iter().collect(),
        }
    }

    /// Column binding, if any.
    pub fn columns(&self) -> Option<&[Column]> {
        self.columns.as_deref()
    }

    /// Append a row, checking arity against the bound columns.
    pub fn push(&mut self, row: Row) -> TypeResult<()> {
        if let Some(columns) = &self.columns {
            if row.len() != columns.len() {
                return Err(TypeError::ArityMismatch {
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_row(mut self, row: Row) -> TypeResult<Self> {
        self.push(row)?;
        Ok(self)
    }

    /// Append `count` copies of `row`.
    pub fn push_repeated(&mut self, row: Row, count: usize) -> TypeResult<()> {
        for _ in 0..count {
            self.push(row.clone())?;
        }
        Ok(())
    }

    /// Append every row of `other`.
    ///
    /// Both sets must agree on their column binding when both are bound.
    pub fn extend_from(&mut self, other: &DataSet) -> TypeResult<()> {
        if let (Some(mine), Some(theirs)) = (&self.columns, &other.columns) {
            if mine != theirs {
                return Err(TypeError::ColumnMismatch {
                    expected: mine.iter().map(|c| c.name().to_owned()).collect(),
                    actual: theirs.iter().map(|c| c.name().to_owned()).collect(),
                });
            }
        }
        for row in &other.rows {
            self.push(row.clone())?;
        }
        Ok(())
    }

    /// A new data set with the first `n` rows (same binding).
    pub fn head(&self, n: usize) -> DataSet {
        self.slice(0, n.min(self.rows.len()))
    }

    /// A new data set with the last `n` rows (same binding).
    pub fn tail(&self, n: usize) -> DataSet {
        let len = self.rows.len();
        self.slice(len - n.min(len), len)
    }

    fn slice(&self, start: usize, end: usize) -> DataSet {
        DataSet {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for DataSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl FromIterator<Row> for DataSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}
