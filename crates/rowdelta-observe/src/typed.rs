//! Observers that speak in domain values instead of rows.

use std::borrow::Borrow;

use rowdelta_types::{DataSet, Row};
use rowdelta_verify::{Delta, DeltaSummary, ErrorLog};

use crate::checkpoint::{Checkpoint, Claims};
use crate::conversion::Conversion;
use crate::error::ObserveResult;
use crate::observer::{Observer, ObserverConfig};
use crate::source::SnapshotProvider;

/// An [`Observer`] paired with a [`Conversion`].
pub struct TypedObserver<T, S> {
    observer: Observer<S>,
    conversion: Conversion<T>,
}

impl<T, S: SnapshotProvider> TypedObserver<T, S> {
    /// Observe `source`, reading its current contents as the baseline.
    pub fn new(source: S, conversion: Conversion<T>) -> ObserveResult<Self> {
        Self::with_config(source, conversion, ObserverConfig::default())
    }

    pub fn with_config(
        source: S,
        conversion: Conversion<T>,
        config: ObserverConfig,
    ) -> ObserveResult<Self> {
        Ok(Self {
            observer: Observer::with_config(source, config)?,
            conversion,
        })
    }

    /// Observe `source`, taking `items` as its current contents. The
    /// source is not queried.
    pub fn with_baseline<I>(
        source: S,
        conversion: Conversion<T>,
        items: I,
    ) -> ObserveResult<Self>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let initial = encode_all(&conversion, items);
        Ok(Self {
            observer: Observer::with_baseline(source, &initial)?,
            conversion,
        })
    }

    /// Changes since the previous checkpoint.
    pub fn delta(&mut self) -> ObserveResult<TypedDelta<T>> {
        Ok(TypedDelta {
            delta: self.observer.delta()?,
            conversion: self.conversion.clone(),
        })
    }

    pub fn log_errors_to(&mut self, log: Option<ErrorLog>) -> &mut Self {
        self.observer.log_errors_to(log);
        self
    }

    pub fn observer(&self) -> &Observer<S> {
        &self.observer
    }

    pub fn conversion(&self) -> &Conversion<T> {
        &self.conversion
    }

    /// The current baseline, decoded.
    pub fn baseline(&self) -> ObserveResult<Vec<T>> {
        decode_all(&self.conversion, self.observer.baseline().to_vec())
    }
}

impl<T, S: SnapshotProvider> Checkpoint for TypedObserver<T, S> {
    type Delta = TypedDelta<T>;

    fn checkpoint(&mut self) -> ObserveResult<TypedDelta<T>> {
        self.delta()
    }
}

impl<T, S> std::fmt::Debug for TypedObserver<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedObserver")
            .field("observer", &self.observer)
            .field("conversion", &self.conversion)
            .finish()
    }
}

/// A [`Delta`] whose claims are domain values.
#[derive(Debug)]
pub struct TypedDelta<T> {
    delta: Delta,
    conversion: Conversion<T>,
}

impl<T> TypedDelta<T> {
    /// Claim that `items` were removed.
    pub fn before<I>(&mut self, items: I) -> ObserveResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let rows = encode_all(&self.conversion, items);
        self.delta.before(&rows)?;
        Ok(self)
    }

    /// Claim that `items` were added.
    pub fn after<I>(&mut self, items: I) -> ObserveResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let rows = encode_all(&self.conversion, items);
        self.delta.after(&rows)?;
        Ok(self)
    }

    pub fn end(&mut self) -> ObserveResult<DeltaSummary> {
        Ok(self.delta.end()?)
    }

    /// Removed values not yet claimed.
    pub fn unclaimed_removed(&self) -> ObserveResult<Vec<T>> {
        decode_all(&self.conversion, self.delta.pending_removed().to_vec())
    }

    /// Added values not yet claimed.
    pub fn unclaimed_added(&self) -> ObserveResult<Vec<T>> {
        decode_all(&self.conversion, self.delta.pending_added().to_vec())
    }

    /// The underlying row delta.
    pub fn inner(&self) -> &Delta {
        &self.delta
    }

    pub fn into_inner(self) -> Delta {
        self.delta
    }
}

impl<T> Claims for TypedDelta<T> {
    type Item = T;

    fn before<I>(&mut self, items: I) -> ObserveResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        TypedDelta::before(self, items)
    }

    fn after<I>(&mut self, items: I) -> ObserveResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Borrow<Self::Item>,
    {
        TypedDelta::after(self, items)
    }

    fn end(&mut self) -> ObserveResult<DeltaSummary> {
        TypedDelta::end(self)
    }
}

fn encode_all<T, I>(conversion: &Conversion<T>, items: I) -> DataSet
where
    I: IntoIterator,
    I::Item: Borrow<T>,
{
    items
        .into_iter()
        .map(|item| conversion.encode(item.borrow()))
        .collect()
}

fn decode_all<T>(conversion: &Conversion<T>, rows: Vec<Row>) -> ObserveResult<Vec<T>> {
    rows.iter()
        .map(|r| conversion.decode(r).map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::tests::{user_columns, user_conversion, User};
    use crate::memory::MemoryTable;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn users() -> Vec<User> {
        vec![
            User::new("linus", "Linus Torvalds", date(2015, 1, 1)),
            User::new("steve", "Steve Jobs", date(2015, 12, 31)),
            User::new("bill", "Bill Gates", date(2015, 9, 12)),
        ]
    }

    fn seeded() -> MemoryTable {
        let t = MemoryTable::new("users", user_columns());
        let conv = user_conversion();
        for u in users() {
            t.insert_row(conv.encode(&u)).unwrap();
        }
        t
    }

    #[test]
    fn no_changes() {
        let t = seeded();
        let mut obs = TypedObserver::new(&t, user_conversion()).unwrap();
        assert_eq!(obs.baseline().unwrap().len(), 3);
        obs.delta().unwrap().end().unwrap();
    }

    #[test]
    fn insertion_claimed_with_values() {
        let t = seeded();
        let mut obs = TypedObserver::new(&t, user_conversion()).unwrap();
        let u = User::new("ada", "Ada Lovelace", date(1815, 12, 10));
        t.insert_row(user_conversion().encode(&u)).unwrap();

        let mut d = obs.delta().unwrap();
        assert_eq!(d.unclaimed_added().unwrap(), vec![u.clone()]);
        d.after([&u]).unwrap();
        assert_eq!(d.end().unwrap().added, 1);
    }

    #[test]
    fn update_claimed_on_both_sides() {
        let t = seeded();
        let mut obs = TypedObserver::new(&t, user_conversion()).unwrap();
        let conv = user_conversion();
        let old = users().remove(0);
        let mut new = old.clone();
        new.name = "Linus B. Torvalds".into();
        t.update_where(|r| *r == conv.encode(&old), |_| conv.encode(&new))
            .unwrap();

        obs.delta()
            .unwrap()
            .before(vec![old])
            .unwrap()
            .after(vec![new])
            .unwrap()
            .end()
            .unwrap();
    }

    #[test]
    fn wrong_claim_reports_unsatisfied_row() {
        let t = seeded();
        let mut obs = TypedObserver::new(&t, user_conversion()).unwrap();
        let ghost = User::new("ghost", "Nobody", date(2000, 1, 1));

        let mut d = obs.delta().unwrap();
        d.before([ghost.clone()]).unwrap();
        let err = d.end().unwrap_err();
        assert!(err.is_assertion());
        let report = err.assertion().unwrap().report();
        assert_eq!(report.removed.unsatisfied, vec![user_conversion().encode(&ghost)]);
    }

    #[test]
    fn deletes_after_explicit_baseline() {
        let t = seeded();
        let mut obs = TypedObserver::with_baseline(&t, user_conversion(), users()).unwrap();
        t.delete_all();
        obs.delta().unwrap().before(users()).unwrap().end().unwrap();
        assert!(obs.baseline().unwrap().is_empty());
    }

    #[test]
    fn undecodable_rows_surface_as_type_errors() {
        let t = seeded();
        let mut obs = TypedObserver::new(&t, user_conversion()).unwrap();
        t.insert_row(rowdelta_types::row!["x", "y", "not a date"]).unwrap();
        let d = obs.delta().unwrap();
        assert!(matches!(
            d.unclaimed_added().unwrap_err(),
            crate::error::ObserveError::Type(_)
        ));
    }

    #[test]
    fn typed_observer_is_a_checkpoint() {
        fn inserted<C>(c: &mut C, u: &User) -> ObserveResult<DeltaSummary>
        where
            C: Checkpoint<Delta = TypedDelta<User>>,
        {
            let mut d = c.checkpoint()?;
            Claims::after(&mut d, [u])?;
            Claims::end(&mut d)
        }
        let t = seeded();
        let mut obs = TypedObserver::new(&t, user_conversion()).unwrap();
        let u = User::new("grace", "Grace Hopper", date(1906, 12, 9));
        t.insert_row(user_conversion().encode(&u)).unwrap();
        assert_eq!(inserted(&mut obs, &u).unwrap().added, 1);
    }
}
