//! WHERE compiler.
//!
//! Walks the descriptor columns in order and emits one leaf per set field,
//! then appends one OR clause per populated OR-group. OR-group elements are
//! compiled recursively with the same descriptor.

use super::predicate::{CompareOp, Operand, Predicate};
use super::resolve;
use crate::error::ValueError;
use crate::reflect::{FieldValue, Reflect};
use crate::schema::{ColumnDescriptor, Operator, OrGroupDescriptor, TypeDescriptor};
use crate::value::{self, Arg};
use sea_query::Value;

pub(crate) fn compile(
    descriptor: &TypeDescriptor,
    groups: &OrGroupDescriptor,
    value: &dyn Reflect,
) -> Result<Predicate, ValueError> {
    let mut clauses = Vec::new();

    for column in descriptor.columns() {
        let field = resolve(value, column.path())?;
        if let Some(clause) = comparison(column, field)? {
            clauses.push(clause);
        }
    }

    for group in groups.fields() {
        let items = match value.field(group.index)? {
            FieldValue::Unset => continue,
            FieldValue::Group(items) => items,
            _ => return Err(ValueError::OrGroupNotCollection { field: group.name }),
        };

        let mut branches = Vec::with_capacity(items.len());
        for item in items {
            let branch = compile(descriptor, groups, item)?;
            if !branch.is_empty() {
                branches.push(branch);
            }
        }
        if !branches.is_empty() {
            clauses.push(Predicate::Or(branches));
        }
    }

    Ok(Predicate::And(clauses))
}

fn comparison(
    column: &ColumnDescriptor,
    value: FieldValue<'_>,
) -> Result<Option<Predicate>, ValueError> {
    let leaf = |op: CompareOp, operand: Operand| Predicate::compare(column.field, op, operand);

    let predicate = match (column.operator, value) {
        (_, FieldValue::Unset) => return Ok(None),

        (op, FieldValue::Scalar(arg)) if binary(op).is_some() => {
            let operand = match arg {
                Arg::Value(v) => Operand::Value(v),
                Arg::Column(c) => Operand::Column(c),
            };
            leaf(binary(op).unwrap_or(CompareOp::Eq), operand)
        }

        (Operator::In, FieldValue::List(values)) => leaf(CompareOp::In, Operand::List(values)),
        (Operator::NotIn, FieldValue::List(values)) => {
            leaf(CompareOp::NotIn, Operand::List(values))
        }

        (op @ (Operator::Like | Operator::LeftLike | Operator::RightLike | Operator::FullLike), FieldValue::Scalar(arg)) => {
            let text = match &arg {
                Arg::Value(v) => value::as_text(v),
                Arg::Column(_) => None,
            };
            let text = text.ok_or(ValueError::NotText {
                field: column.name,
                operator: op.token(),
            })?;
            if text.is_empty() {
                return Ok(None);
            }
            let pattern = match op {
                Operator::LeftLike => format!("%{}", text),
                Operator::RightLike => format!("{}%", text),
                Operator::FullLike => format!("%{}%", text),
                _ => text.to_string(),
            };
            leaf(CompareOp::Like, Operand::Value(Value::from(pattern)))
        }

        (Operator::Null, FieldValue::Scalar(arg)) => {
            let is_null = match &arg {
                Arg::Value(v) => value::as_bool(v),
                Arg::Column(_) => None,
            };
            match is_null.ok_or(ValueError::NotBool { field: column.name })? {
                true => leaf(CompareOp::IsNull, Operand::None),
                false => leaf(CompareOp::IsNotNull, Operand::None),
            }
        }

        (Operator::JsonContains, FieldValue::Json(doc)) => {
            leaf(CompareOp::JsonContains, json_operand(column, &doc)?)
        }

        (op @ (Operator::JsonContainsAny | Operator::JsonContainsAll), FieldValue::JsonList(docs)) => {
            let mut leaves = docs
                .iter()
                .map(|doc| Ok(leaf(CompareOp::JsonContains, json_operand(column, doc)?)))
                .collect::<Result<Vec<_>, ValueError>>()?;
            match leaves.len() {
                0 => return Ok(None),
                1 => leaves.remove(0),
                _ if op == Operator::JsonContainsAny => Predicate::Or(leaves),
                _ => Predicate::And(leaves),
            }
        }

        (op, other) => {
            return Err(ValueError::Shape {
                field: column.name,
                token: op.token(),
                found: other.kind(),
            })
        }
    };

    Ok(Some(predicate))
}

fn binary(op: Operator) -> Option<CompareOp> {
    match op {
        Operator::Eq => Some(CompareOp::Eq),
        Operator::Ne => Some(CompareOp::Ne),
        Operator::Lt => Some(CompareOp::Lt),
        Operator::Le => Some(CompareOp::Le),
        Operator::Gt => Some(CompareOp::Gt),
        Operator::Ge => Some(CompareOp::Ge),
        _ => None,
    }
}

fn json_operand(column: &ColumnDescriptor, doc: &serde_json::Value) -> Result<Operand, ValueError> {
    let encoded = serde_json::to_string(doc).map_err(|source| ValueError::JsonEncode {
        field: column.name,
        source,
    })?;
    Ok(Operand::Value(Value::from(encoded)))
}
