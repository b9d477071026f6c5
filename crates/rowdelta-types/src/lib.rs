//! Foundation types for rowdelta.
//!
//! This crate provides the value, row and data set types shared by every
//! other rowdelta crate. Rows are immutable, compare by value, and carry a
//! content fingerprint computed once at construction so they can be used
//! as multiset keys cheaply.
//!
//! # Key Types
//!
//! - [`Value`] -- A single typed column value (null, numeric, text, temporal, binary)
//! - [`Row`] -- Immutable ordered tuple of values with a cached fingerprint
//! - [`Column`] -- Column descriptor supplied by the caller
//! - [`DataSet`] -- Ordered, caller-specified collection of rows

pub mod column;
pub mod data_set;
pub mod error;
pub mod row;
pub mod value;

pub use column::{columns, Column};
pub use data_set::DataSet;
pub use error::{TypeError, TypeResult};
pub use row::Row;
pub use value::Value;
