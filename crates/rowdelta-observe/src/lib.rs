//! Observers for rowdelta.
//!
//! An [`Observer`] remembers the last known state of a data source (its
//! baseline). Each call to [`Observer::delta`] re-queries the source, returns
//! a [`Delta`](rowdelta_verify::Delta) describing what changed since the
//! previous checkpoint, and moves the baseline forward.
//!
//! # Key Types
//!
//! - [`SnapshotProvider`] -- Anything that can list its columns and return its current rows
//! - [`Observer`] / [`ObserverConfig`] -- Baseline tracking over a provider
//! - [`Conversion`] / [`TypedObserver`] / [`TypedDelta`] -- The same, in terms of domain values
//! - [`Checkpoint`] / [`Claims`] -- Common interface over plain and typed observers
//! - [`MemoryTable`] / [`TableQuery`] / [`FnSource`] -- In-memory and closure-backed providers
//!
//! # Design Rules
//!
//! 1. The baseline is replaced, never mutated, at every checkpoint.
//! 2. Source failures are propagated with their cause; nothing is retried.
//! 3. Observers are single-threaded; callers serialize access.

pub mod checkpoint;
pub mod conversion;
pub mod error;
pub mod memory;
pub mod observer;
pub mod source;
pub mod typed;

pub use checkpoint::{Checkpoint, Claims};
pub use conversion::Conversion;
pub use error::{ObserveError, ObserveResult, SourceError, SourceResult};
pub use memory::{MemoryTable, TableQuery};
pub use observer::{Observer, ObserverConfig};
pub use source::{FnSource, SnapshotProvider};
pub use typed::{TypedDelta, TypedObserver};
