//! UPDATE compiler.

use super::predicate::quote_column;
use super::resolve;
use crate::error::ValueError;
use crate::reflect::{FieldValue, Reflect};
use crate::schema::{Assign, ColumnDescriptor, TypeDescriptor};
use crate::value::{self, Arg};
use indexmap::IndexMap;
use sea_query::Value;

/// The right-hand side of one `SET` assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Value(Value),
    Expr(SqlExpr),
}

/// A SQL fragment with its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlExpr {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlExpr {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Column assignments in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateMap {
    assignments: IndexMap<String, Assignment>,
}

impl UpdateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, assignment: Assignment) {
        self.assignments.insert(column.into(), assignment);
    }

    pub fn get(&self, column: &str) -> Option<&Assignment> {
        self.assignments.get(column)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.assignments.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Assignment)> {
        self.assignments.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for UpdateMap {
    type Item = (String, Assignment);
    type IntoIter = indexmap::map::IntoIter<String, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.into_iter()
    }
}

pub(crate) fn compile(
    descriptor: &TypeDescriptor,
    value: &dyn Reflect,
) -> Result<UpdateMap, ValueError> {
    let mut map = UpdateMap::new();
    for column in descriptor.columns() {
        let field = resolve(value, column.path())?;
        if let Some(assignment) = assignment(column, field)? {
            map.insert(column.field, assignment);
        }
    }
    Ok(map)
}

fn assignment(
    column: &ColumnDescriptor,
    value: FieldValue<'_>,
) -> Result<Option<Assignment>, ValueError> {
    let assignment = match (column.assign, value) {
        (_, FieldValue::Unset) => return Ok(None),
        (Assign::Set, FieldValue::Scalar(Arg::Value(v))) => Assignment::Value(v),
        (Assign::Set, FieldValue::Scalar(Arg::Column(c))) => {
            Assignment::Expr(SqlExpr::new(quote_column(c.as_str()), Vec::new()))
        }
        (Assign::Add, FieldValue::Scalar(arg)) => arithmetic(column.field, '+', arg),
        (Assign::Sub, FieldValue::Scalar(arg)) => arithmetic(column.field, '-', arg),
        (Assign::JsonSet, FieldValue::Json(doc)) => match json_set(column, &doc)? {
            Some(expr) => Assignment::Expr(expr),
            None => return Ok(None),
        },
        (Assign::MergeJson, FieldValue::Json(doc)) => match merge_json(column, doc)? {
            Some(expr) => Assignment::Expr(expr),
            None => return Ok(None),
        },
        (assign, other) => {
            return Err(ValueError::Shape {
                field: column.name,
                token: assign.token(),
                found: other.kind(),
            })
        }
    };
    Ok(Some(assignment))
}

/// `` `balance` + ? `` or `` `score` - `penalty` ``.
fn arithmetic(field: &str, sign: char, arg: Arg) -> Assignment {
    let column = quote_column(field);
    match arg {
        Arg::Value(v) => Assignment::Expr(SqlExpr::new(format!("{} {} ?", column, sign), vec![v])),
        Arg::Column(c) => Assignment::Expr(SqlExpr::new(
            format!("{} {} {}", column, sign, quote_column(c.as_str())),
            Vec::new(),
        )),
    }
}

/// `JSON_SET(col, '$.k1', ?, '$.k2', CAST(? AS JSON))` over the non-null keys.
fn json_set(
    column: &ColumnDescriptor,
    doc: &serde_json::Value,
) -> Result<Option<SqlExpr>, ValueError> {
    let object = match doc {
        serde_json::Value::Object(object) => object,
        serde_json::Value::Null => return Ok(None),
        _ => return Err(ValueError::JsonSetNotObject { field: column.name }),
    };

    let mut pairs = Vec::new();
    let mut params = Vec::new();
    for (key, v) in object.iter().filter(|(_, v)| !v.is_null()) {
        let path = format!("'$.{}'", key.replace('\'', "''"));
        if v.is_array() || v.is_object() {
            pairs.push(format!("{}, CAST(? AS JSON)", path));
            params.push(Value::from(v.to_string()));
        } else {
            pairs.push(format!("{}, ?", path));
            params.push(value::json_leaf(v));
        }
    }
    if pairs.is_empty() {
        return Ok(None);
    }

    let sql = format!("JSON_SET({}, {})", quote_column(column.field), pairs.join(", "));
    Ok(Some(SqlExpr::new(sql, params)))
}

/// Initializes the column when null or empty, merges with `JSON_MERGE_PATCH`
/// otherwise. The blob is bound once per branch. Nulls inside the document
/// are kept: they delete keys.
fn merge_json(
    column: &ColumnDescriptor,
    doc: serde_json::Value,
) -> Result<Option<SqlExpr>, ValueError> {
    if doc.is_null() {
        return Ok(None);
    }

    let blob = serde_json::to_string(&doc).map_err(|source| ValueError::JsonEncode {
        field: column.name,
        source,
    })?;
    let quoted = quote_column(column.field);
    let sql = format!(
        "CASE WHEN ({c} IS NULL OR {c} = '') THEN CAST(? AS JSON) ELSE JSON_MERGE_PATCH({c}, CAST(? AS JSON)) END",
        c = quoted
    );
    Ok(Some(SqlExpr::new(
        sql,
        vec![Value::from(blob.clone()), Value::from(blob)],
    )))
}
