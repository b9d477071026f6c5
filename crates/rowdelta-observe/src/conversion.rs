use std::sync::Arc;

use rowdelta_types::{Row, TypeResult};

type Encode<T> = Arc<dyn Fn(&T) -> Row + Send + Sync>;
type Decode<T> = Arc<dyn Fn(&Row) -> TypeResult<T> + Send + Sync>;

/// Two-way mapping between a domain type and rows.
///
/// Supplied explicitly at construction as an `{encode, decode}` pair. The
/// pair must be a bijection over the declared columns: for every valid
/// value `t`, `decode(encode(t)) == t`.
pub struct Conversion<T> {
    encode: Encode<T>,
    decode: Decode<T>,
}

impl<T> Conversion<T> {
    pub fn new(
        encode: impl Fn(&T) -> Row + Send + Sync + 'static,
        decode: impl Fn(&Row) -> TypeResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    /// Domain value to row.
    pub fn encode(&self, value: &T) -> Row {
        (self.encode)(value)
    }

    /// Row to domain value.
    pub fn decode(&self, row: &Row) -> TypeResult<T> {
        (self.decode)(row)
    }

    /// `decode(encode(value))`.
    pub fn round_trip(&self, value: &T) -> TypeResult<T> {
        self.decode(&self.encode(value))
    }
}

impl<T> Clone for Conversion<T> {
    fn clone(&self) -> Self {
        Self {
            encode: Arc::clone(&self.encode),
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> std::fmt::Debug for Conversion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversion")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rowdelta_types::{row, Column, TypeError, Value};

    /// Test fixture shared with the observer tests.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct User {
        pub login: String,
        pub name: String,
        pub created: NaiveDate,
    }

    impl User {
        pub fn new(login: &str, name: &str, created: NaiveDate) -> Self {
            Self {
                login: login.into(),
                name: name.into(),
                created,
            }
        }
    }

    pub(crate) fn user_columns() -> Vec<Column> {
        rowdelta_types::columns(["login", "name", "created"])
    }

    fn text(row: &Row, i: usize) -> TypeResult<String> {
        row.get(i)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| TypeError::UnexpectedValue {
                position: i,
                expected: "text",
                actual: row.get(i).map_or("missing", Value::kind).to_owned(),
            })
    }

    pub(crate) fn user_conversion() -> Conversion<User> {
        Conversion::new(
            |u: &User| row![u.login.as_str(), u.name.as_str(), u.created],
            |r: &Row| {
                let created = r.get(2).and_then(Value::as_date).ok_or_else(|| {
                    TypeError::Conversion(format!("bad created column in {r}"))
                })?;
                Ok(User {
                    login: text(r, 0)?,
                    name: text(r, 1)?,
                    created,
                })
            },
        )
    }

    #[test]
    fn decode_reports_bad_rows() {
        let conv = user_conversion();
        let err = conv.decode(&row![1, "x", Value::Null]).unwrap_err();
        assert!(matches!(err, TypeError::Conversion(_)));
    }

    #[test]
    fn clones_share_functions() {
        let conv = user_conversion();
        let copy = conv.clone();
        let u = User::new("a", "A", NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        assert_eq!(conv.encode(&u), copy.encode(&u));
    }

    proptest! {
        #[test]
        fn round_trip_is_identity(
            login in "[a-z]{1,8}",
            name in ".{0,12}",
            days in 0i64..40_000,
        ) {
            let base = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            let created = base + chrono::Duration::days(days);
            let u = User { login, name, created };
            prop_assert_eq!(user_conversion().round_trip(&u).unwrap(), u);
        }
    }
}
