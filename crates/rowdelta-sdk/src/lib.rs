//! High-level API for rowdelta.
//!
//! Most tests only need this crate: observe a table, run the code under
//! test, then assert exactly which rows it inserted, deleted or changed.
//!
//! ```
//! use rowdelta_sdk::{assert_inserted, columns, observe, row, MemoryTable};
//!
//! let users = MemoryTable::new("users", columns(["login", "age"]));
//! let mut obs = observe(&users).unwrap();
//!
//! users.insert_row(row!["ada", 36]).unwrap();
//!
//! assert_inserted(&mut obs, [row!["ada", 36]]).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod facade;
pub mod harness;

pub use config::{HarnessConfig, LogTarget};
pub use error::{SdkError, SdkResult};
pub use facade::{
    assert_changed, assert_deleted, assert_inserted, assert_no_changes, delete_all,
    delete_all_matching, delta, insert_into, observe, observe_typed, observe_with, truncate,
    version,
};
pub use harness::Harness;

// Re-export key types
pub use rowdelta_diff::{RowSet, RowSetDiff};
pub use rowdelta_observe::{
    Checkpoint, Claims, Conversion, FnSource, MemoryTable, Observer, ObserverConfig,
    SnapshotProvider, TableQuery, TypedDelta, TypedObserver,
};
pub use rowdelta_types::{columns, row, Column, DataSet, Row, Value};
pub use rowdelta_verify::{
    Delta, DeltaAssertionError, DeltaSummary, ErrorLog, LogFormat, MismatchReport,
};
