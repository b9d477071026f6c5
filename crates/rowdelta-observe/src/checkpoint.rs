//! Common interface over plain and typed observers.

use std::borrow::Borrow;

use rowdelta_types::Row;
use rowdelta_verify::{Delta, DeltaSummary};

use crate::error::ObserveResult;

/// A delta that accepts claims and can be finalized.
pub trait Claims {
    /// What a claim is made of: rows, or domain values for typed deltas.
    type Item;

    /// Claim removals.
    fn before<I>(&mut self, items: I) -> ObserveResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>;

    /// Claim additions.
    fn after<I>(&mut self, items: I) -> ObserveResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>;

    /// Finalize the check.
    fn end(&mut self) -> ObserveResult<DeltaSummary>;
}

/// Something that can produce a delta on demand.
pub trait Checkpoint {
    type Delta: Claims;

    /// Re-read the source and return the changes since the last checkpoint.
    fn checkpoint(&mut self) -> ObserveResult<Self::Delta>;
}

impl Claims for Delta {
    type Item = Row;

    fn before<I>(&mut self, items: I) -> ObserveResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        Ok(Delta::before(self, items)?)
    }

    fn after<I>(&mut self, items: I) -> ObserveResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        Ok(Delta::after(self, items)?)
    }

    fn end(&mut self) -> ObserveResult<DeltaSummary> {
        Ok(Delta::end(self)?)
    }
}
