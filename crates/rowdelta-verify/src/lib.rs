//! Delta verification for rowdelta.
//!
//! A [`Delta`] holds the rows removed and added between two snapshots. Test
//! code claims rows with [`Delta::before`] and [`Delta::after`]; each claim
//! consumes one matching occurrence. [`Delta::end`] succeeds only if every
//! actual change was claimed and every claim matched an actual change.
//! Otherwise it fails with a [`DeltaAssertionError`] whose
//! [`MismatchReport`] lists both kinds of discrepancy.
//!
//! # Key Types
//!
//! - [`Delta`] / [`DeltaSummary`] -- The claim-and-consume protocol
//! - [`MismatchReport`] / [`MismatchGroup`] -- Diagnostic payload of a failed check
//! - [`ErrorLog`] / [`LogSink`] -- Where failed checks are dumped before the error is returned

pub mod delta;
pub mod error;
pub mod log;
pub mod report;

pub use delta::{Delta, DeltaSummary};
pub use error::{DeltaAssertionError, VerifyError, VerifyResult};
pub use log::{ErrorLog, LogFormat, LogSink, MemorySink, WriterSink};
pub use report::{MismatchGroup, MismatchReport};
