use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// An immutable database row.
///
/// A `Row` is an ordered tuple of [`Value`]s. Equality is element-wise over
/// every position. The content fingerprint is a BLAKE3 hash of a canonical
/// encoding of the values; it is computed once at construction and reused by
/// `Hash`, so rows are cheap multiset keys. Clones share storage.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Value>")]
pub struct Row {
    values: Arc<[Value]>,
    fingerprint: u64,
}

impl Row {
    /// Build a row from its column values.
    pub fn new(values: impl Into<Vec<Value>>) -> Self {
        let values: Vec<Value> = values.into();
        let values: Arc<[Value]> = values.into();
        let fingerprint = fingerprint_of(&values);
        Self {
            values,
            fingerprint,
        }
    }

    /// The column values, in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a zero-column row.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The cached 64-bit content fingerprint.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Hex form of the fingerprint (16 characters), for diagnostics.
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint.to_be_bytes())
    }

    /// Project onto the given column positions.
    pub fn project(&self, positions: &[usize]) -> Row {
        Row::new(
            positions
                .iter()
                .map(|&i| self.values.get(i).cloned().unwrap_or(Value::Null))
                .collect::<Vec<_>>(),
        )
    }

    /// Render the row as a JSON array of plain scalars.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.values.iter().map(Value::to_json).collect())
    }
}

fn fingerprint_of(values: &[Value]) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(values.len() as u64).to_le_bytes());
    for value in values {
        value.encode_into(&mut hasher);
    }
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
            || (self.fingerprint == other.fingerprint && self.values == other.values)
    }
}

impl Eq for Row {}

impl Hash for Row {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row{self}")
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}

impl From<Row> for Vec<Value> {
    fn from(row: Row) -> Self {
        row.values.to_vec()
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Row::new(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Build a [`Row`] from values convertible into [`Value`].
///
/// ```
/// use rowdelta_types::{row, Value};
///
/// let r = row!["alice", 42, None::<i64>];
/// assert_eq!(r.len(), 3);
/// assert_eq!(r.get(2), Some(&Value::Null));
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::Row::new(::std::vec::Vec::<$crate::Value>::new())
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Row::new(::std::vec![$($crate::Value::from($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn equal_values_equal_rows() {
        let a = row!["a", 1];
        let b = row!["a", 1];
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn position_matters() {
        assert_ne!(row!["a", "b"], row!["b", "a"]);
    }

    #[test]
    fn arity_matters() {
        assert_ne!(row!["a"], row!["a", Value::Null]);
    }

    #[test]
    fn text_boundaries_do_not_collide() {
        assert_ne!(row!["ab", "c"], row!["a", "bc"]);
    }

    #[test]
    fn usable_as_hash_key() {
        let mut set = HashSet::new();
        set.insert(row!["x", 9]);
        set.insert(row!["x", 9]);
        set.insert(row!["y", 9]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_matches_tuple_form() {
        assert_eq!(row!["c", 3].to_string(), "[\"c\", 3]");
        assert_eq!(format!("{:?}", row![1]), "Row[1]");
    }

    #[test]
    fn fingerprint_hex_is_16_chars() {
        assert_eq!(row![1, 2].fingerprint_hex().len(), 16);
    }

    #[test]
    fn project_picks_positions() {
        let r = row!["a", 1, true];
        assert_eq!(r.project(&[2, 0]), row![true, "a"]);
    }

    #[test]
    fn serde_roundtrip_preserves_fingerprint() {
        let r = row!["a", 1.5, None::<i32>];
        let json = serde_json::to_string(&r).unwrap();
        let parsed: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
        assert_eq!(parsed.fingerprint(), r.fingerprint());
    }

    proptest! {
        #[test]
        fn fingerprint_is_a_function_of_content(a in any::<i64>(), s in ".{0,8}") {
            let r1 = row![a, s.clone()];
            let r2 = row![a, s];
            prop_assert_eq!(r1.fingerprint(), r2.fingerprint());
            prop_assert_eq!(r1, r2);
        }
    }
}
