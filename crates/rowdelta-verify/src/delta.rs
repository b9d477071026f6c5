//! The claim-and-consume delta protocol.

use std::borrow::Borrow;

use rowdelta_diff::{diff_row_sets, DiffError, RowSet, RowSetDiff};
use rowdelta_types::{Column, Row};
use tracing::{debug, warn};

use crate::error::{DeltaAssertionError, VerifyError, VerifyResult};
use crate::log::ErrorLog;
use crate::report::{MismatchGroup, MismatchReport};

/// Outcome of a successful [`Delta::end`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeltaSummary {
    /// Removed occurrences matched by `before` declarations.
    pub removed: usize,
    /// Added occurrences matched by `after` declarations.
    pub added: usize,
}

impl DeltaSummary {
    /// Total number of matched changes.
    pub fn total(&self) -> usize {
        self.removed + self.added
    }
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Before,
    After,
}

impl Side {
    fn method(self) -> &'static str {
        match self {
            Side::Before => "before",
            Side::After => "after",
        }
    }
}

/// Changes between two snapshots, plus the verification protocol.
///
/// `before` declarations consume occurrences of removed rows and `after`
/// declarations consume occurrences of added rows. A declaration with no
/// occurrence left to consume is remembered as unsatisfied; nothing fails
/// until [`end`](Self::end). Declarations may be split across any number of
/// calls in any order: only multiplicities matter.
#[derive(Debug)]
pub struct Delta {
    pending_removed: RowSet,
    pending_added: RowSet,
    total_removed: usize,
    total_added: usize,
    matched_removed: usize,
    matched_added: usize,
    unsatisfied_removed: Vec<Row>,
    unsatisfied_added: Vec<Row>,
    columns: Option<Vec<Column>>,
    error_log: Option<ErrorLog>,
    ended: bool,
}

impl Delta {
    /// Diff `old` against `new` and start a delta over the result.
    pub fn new(old: &RowSet, new: &RowSet) -> VerifyResult<Self> {
        Ok(Self::from_diff(diff_row_sets(old, new)?))
    }

    /// Start a delta over an already computed diff.
    pub fn from_diff(diff: RowSetDiff) -> Self {
        let RowSetDiff { removed, added } = diff;
        Self {
            total_removed: removed.len(),
            total_added: added.len(),
            pending_removed: removed,
            pending_added: added,
            matched_removed: 0,
            matched_added: 0,
            unsatisfied_removed: Vec::new(),
            unsatisfied_added: Vec::new(),
            columns: None,
            error_log: None,
            ended: false,
        }
    }

    /// Attach column descriptors.
    ///
    /// Declared rows must then have one value per column, and failure
    /// reports are labelled with the column names.
    pub fn with_columns(mut self, columns: impl Into<Vec<Column>>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    /// Attach an error log that receives the report of a failed `end()`.
    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = Some(log);
        self
    }

    /// Replace (or clear) the attached error log.
    pub fn set_error_log(&mut self, log: Option<ErrorLog>) {
        self.error_log = log;
    }

    /// Claim that `rows` were removed.
    pub fn before<I>(&mut self, rows: I) -> VerifyResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Row>,
    {
        self.declare(Side::Before, rows)?;
        Ok(self)
    }

    /// Claim that `rows` were added.
    pub fn after<I>(&mut self, rows: I) -> VerifyResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Row>,
    {
        self.declare(Side::After, rows)?;
        Ok(self)
    }

    /// Claim that a single row was removed.
    pub fn before_row(&mut self, row: &Row) -> VerifyResult<&mut Self> {
        self.before(std::iter::once(row))
    }

    /// Claim that a single row was added.
    pub fn after_row(&mut self, row: &Row) -> VerifyResult<&mut Self> {
        self.after(std::iter::once(row))
    }

    fn declare<I>(&mut self, side: Side, rows: I) -> VerifyResult<()>
    where
        I: IntoIterator,
        I::Item: Borrow<Row>,
    {
        if self.ended {
            return Err(VerifyError::InvalidUsage(format!(
                "{}() called after end()",
                side.method()
            )));
        }
        let rows: Vec<Row> = rows
            .into_iter()
            .map(|r| Borrow::<Row>::borrow(&r).clone())
            .collect();
        if rows.is_empty() {
            return Err(VerifyError::InvalidUsage(format!(
                "{}() called with no rows",
                side.method()
            )));
        }
        // Validate the whole batch first so a rejected call leaves no trace.
        if let Some(columns) = &self.columns {
            if let Some(bad) = rows.iter().find(|r| r.len() != columns.len()) {
                return Err(VerifyError::InvalidUsage(format!(
                    "{}() row {bad} has {} values, expected {}",
                    side.method(),
                    bad.len(),
                    columns.len()
                )));
            }
        }

        let (pending, matched, unsatisfied) = match side {
            Side::Before => (
                &mut self.pending_removed,
                &mut self.matched_removed,
                &mut self.unsatisfied_removed,
            ),
            Side::After => (
                &mut self.pending_added,
                &mut self.matched_added,
                &mut self.unsatisfied_added,
            ),
        };
        for row in rows {
            if pending.take_one(&row)? {
                *matched += 1;
            } else {
                unsatisfied.push(row);
            }
        }
        Ok(())
    }

    /// Finish the check.
    ///
    /// Succeeds when every actual change was claimed and every claim matched
    /// an actual change. On failure the report is written to the attached
    /// error log (if any) and returned inside
    /// [`VerifyError::Assertion`]. Calling `end()` twice is invalid usage.
    pub fn end(&mut self) -> VerifyResult<DeltaSummary> {
        if self.ended {
            return Err(VerifyError::InvalidUsage(
                "end() called more than once".into(),
            ));
        }
        self.ended = true;
        self.check_accounting()?;

        let report = self.report();
        if report.is_empty() {
            let summary = DeltaSummary {
                removed: self.matched_removed,
                added: self.matched_added,
            };
            debug!(
                removed = summary.removed,
                added = summary.added,
                "delta verified"
            );
            return Ok(summary);
        }

        debug!(mismatches = report.len(), "delta verification failed");
        if let Some(log) = &self.error_log {
            if let Err(e) = log.record(&report) {
                warn!(error = %e, "failed to write delta mismatch to error log");
            }
        }
        Err(DeltaAssertionError::new(report).into())
    }

    /// Matched plus still-pending occurrences must equal what the diff
    /// produced, on each side.
    fn check_accounting(&self) -> VerifyResult<()> {
        let sides = [
            ("removed", self.matched_removed, &self.pending_removed, self.total_removed),
            ("added", self.matched_added, &self.pending_added, self.total_added),
        ];
        for (name, matched, pending, total) in sides {
            if matched + pending.len() != total {
                return Err(DiffError::Internal(format!(
                    "{name}: matched {matched} + pending {} != diffed {total}",
                    pending.len()
                ))
                .into());
            }
        }
        Ok(())
    }

    /// The current mismatches: unclaimed changes and unsatisfied claims.
    pub fn report(&self) -> MismatchReport {
        MismatchReport {
            columns: self.columns.clone().unwrap_or_default(),
            removed: MismatchGroup {
                unclaimed: self.pending_removed.to_vec(),
                unsatisfied: self.unsatisfied_removed.clone(),
            },
            added: MismatchGroup {
                unclaimed: self.pending_added.to_vec(),
                unsatisfied: self.unsatisfied_added.clone(),
            },
        }
    }

    /// Removed occurrences not yet claimed.
    pub fn pending_removed(&self) -> &RowSet {
        &self.pending_removed
    }

    /// Added occurrences not yet claimed.
    pub fn pending_added(&self) -> &RowSet {
        &self.pending_added
    }

    /// `before` declarations that matched nothing.
    pub fn unsatisfied_removed(&self) -> &[Row] {
        &self.unsatisfied_removed
    }

    /// `after` declarations that matched nothing.
    pub fn unsatisfied_added(&self) -> &[Row] {
        &self.unsatisfied_added
    }

    pub fn columns(&self) -> Option<&[Column]> {
        self.columns.as_deref()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}
