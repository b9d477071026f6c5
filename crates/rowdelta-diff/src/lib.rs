//! Diff engine for rowdelta.
//!
//! Compares two row snapshots with multiset semantics: a row that appears
//! twice before and once after has been removed once, not zero times.
//!
//! # Key Types
//!
//! - [`RowSet`] -- Duplicate-aware collection of rows (row -> occurrence count)
//! - [`RowSetDiff`] / [`RowChange`] -- Removed and added multisets between two snapshots

pub mod diff;
pub mod error;
pub mod row_set;

pub use diff::{diff_row_sets, RowChange, RowSetDiff};
pub use error::{DiffError, DiffResult};
pub use row_set::RowSet;
