//! Conversions from Rust field values into bound SQL arguments.
//!
//! [`SqlValue`] covers plain column values and maps them onto
//! [`sea_query::Value`]. [`SqlArg`] additionally admits [`FieldExpr`], a
//! reference to another column that is rendered inline instead of bound.

use sea_query::Value;
use std::fmt;

/// A column reference used as the right-hand side of a comparison or
/// assignment.
///
/// `#[sql(field = "starts_at", operator = "<")] before_end: Option<FieldExpr>`
/// compiles to `` `starts_at` < `ends_at` `` when set to `FieldExpr::new("ends_at")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldExpr(String);

impl FieldExpr {
    pub fn new(column: impl Into<String>) -> Self {
        Self(column.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldExpr {
    fn from(column: &str) -> Self {
        Self::new(column)
    }
}

impl From<String> for FieldExpr {
    fn from(column: String) -> Self {
        Self(column)
    }
}

impl fmt::Display for FieldExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single argument: either a value to bind or a column to reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    Column(FieldExpr),
}

impl Arg {
    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Value(_) => "value",
            Arg::Column(_) => "column reference",
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

/// Types that bind as a single SQL parameter.
pub trait SqlValue {
    fn to_value(&self) -> Value;
}

/// Types that may appear on the right-hand side of a comparison.
pub trait SqlArg {
    fn to_arg(&self) -> Arg;
}

impl<T: SqlValue> SqlArg for T {
    fn to_arg(&self) -> Arg {
        Arg::Value(self.to_value())
    }
}

impl SqlArg for FieldExpr {
    fn to_arg(&self) -> Arg {
        Arg::Column(self.clone())
    }
}

macro_rules! impl_sql_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SqlValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(self.clone())
                }
            }
        )*
    };
}

impl_sql_value!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    Vec<u8>,
    serde_json::Value,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    uuid::Uuid,
    rust_decimal::Decimal,
);

/// Text content of a bound value, if it is a string.
pub(crate) fn as_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(Some(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// Boolean content of a bound value, if it is a bool.
pub(crate) fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(Some(b)) => Some(*b),
        _ => None,
    }
}

/// Scalar JSON leaves bind natively; arrays and objects bind as JSON.
pub(crate) fn json_leaf(value: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match value {
        Json::Bool(b) => Value::from(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        Json::String(s) => Value::from(s.clone()),
        other => Value::from(other.clone()),
    }
}
