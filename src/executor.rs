//! The execution capability the façade delegates to.
//!
//! `tagdal` builds SQL text and bound values; an [`Executor`] runs them
//! against a real connection, pool or transaction. Statements use MySQL
//! placeholder syntax (`?`).

use crate::error::{Error, Result};
use sea_query::{Value, ValueType};
use std::sync::Arc;

/// Trait for executing statements built by the façade.
///
/// # Examples
///
/// ```
/// use tagdal::{Executor, Row};
/// use tagdal::sea_query::Value;
///
/// struct Noop;
///
/// impl Executor for Noop {
///     fn execute(&self, _sql: &str, _values: &[Value]) -> tagdal::Result<u64> {
///         Ok(0)
///     }
///
///     fn query_all(&self, _sql: &str, _values: &[Value]) -> tagdal::Result<Vec<Row>> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Executor: Send + Sync {
    /// Runs a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Implementations report driver failures as [`Error::Executor`].
    fn execute(&self, sql: &str, values: &[Value]) -> Result<u64>;

    /// Runs a query and returns every row.
    fn query_all(&self, sql: &str, values: &[Value]) -> Result<Vec<Row>>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, sql: &str, values: &[Value]) -> Result<u64> {
        (**self).execute(sql, values)
    }

    fn query_all(&self, sql: &str, values: &[Value]) -> Result<Vec<Row>> {
        (**self).query_all(sql, values)
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, sql: &str, values: &[Value]) -> Result<u64> {
        (**self).execute(sql, values)
    }

    fn query_all(&self, sql: &str, values: &[Value]) -> Result<Vec<Row>> {
        (**self).query_all(sql, values)
    }
}

/// One result row: column names with their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, builder style.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(column.into());
        self.values.push(value.into());
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Value at a position, for unnamed results such as `COUNT(*)`.
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Decodes a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the column is missing or holds a value
    /// of another type.
    pub fn get<T: ValueType>(&self, column: &str) -> Result<T> {
        let value = self.value(column).ok_or_else(|| Error::Decode {
            column: column.to_string(),
            message: "column not found".to_string(),
        })?;
        decode(column, value)
    }

    pub fn get_at<T: ValueType>(&self, index: usize) -> Result<T> {
        let value = self.value_at(index).ok_or_else(|| Error::Decode {
            column: format!("#{}", index),
            message: "column not found".to_string(),
        })?;
        decode(&format!("#{}", index), value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn decode<T: ValueType>(column: &str, value: &Value) -> Result<T> {
    <T as ValueType>::try_from(value.clone()).map_err(|err| Error::Decode {
        column: column.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_get() {
        let row = Row::new()
            .with("id", 3i64)
            .with("name", "dirac".to_string())
            .with("nickname", Option::<String>::None);
        assert_eq!(row.len(), 3);
        assert_eq!(row.get::<i64>("id").unwrap(), 3);
        assert_eq!(row.get::<String>("name").unwrap(), "dirac");
        assert_eq!(row.get::<Option<String>>("nickname").unwrap(), None);
        assert_eq!(row.get_at::<i64>(0).unwrap(), 3);
    }

    #[test]
    fn test_row_decode_errors() {
        let row = Row::new().with("id", 3i64);
        match row.get::<i64>("missing") {
            Err(Error::Decode { column, .. }) => assert_eq!(column, "missing"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(row.get::<String>("id"), Err(Error::Decode { .. })));
    }
}
