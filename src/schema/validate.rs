//! Per-field declaration checks.

use super::token::{Assign, Operator};
use crate::error::SchemaError;
use crate::reflect::{FieldDecl, FieldKind};

pub(super) fn check_operator(decl: &FieldDecl) -> Result<Operator, SchemaError> {
    Operator::parse(decl.operator).ok_or(SchemaError::InvalidOperator {
        field: decl.name,
        token: decl.operator.unwrap_or_default(),
    })
}

pub(super) fn check_expr(decl: &FieldDecl) -> Result<Assign, SchemaError> {
    Assign::parse(decl.expr).ok_or(SchemaError::InvalidExpr {
        field: decl.name,
        token: decl.expr.unwrap_or_default(),
    })
}

/// Leaf fields must be able to say "not specified". Bare collections are
/// only accepted for multi-valued operators, where empty means unset.
pub(super) fn check_shape(decl: &FieldDecl, operator: Operator) -> Result<(), SchemaError> {
    match decl.kind {
        FieldKind::Optional | FieldKind::OptionalCollection => Ok(()),
        FieldKind::Collection if operator.is_multi_valued() => Ok(()),
        kind => Err(SchemaError::MustBeOptional {
            field: decl.name,
            kind: kind.name(),
        }),
    }
}

pub(super) fn check_flatten(decl: &FieldDecl, mapping: Option<&str>) -> Result<(), SchemaError> {
    match mapping {
        Some(_) => Err(SchemaError::EmbeddedWithMapping { field: decl.name }),
        None => Ok(()),
    }
}

pub(super) fn check_or_group(decl: &FieldDecl) -> Result<(), SchemaError> {
    if decl.kind.is_collection() {
        Ok(())
    } else {
        Err(SchemaError::OrGroupShape { field: decl.name })
    }
}
