//! Compiled query artifacts: predicates and update maps.

pub(crate) mod filter;
pub mod predicate;
pub(crate) mod update;

pub use predicate::{quote_column, CompareOp, Comparison, Fragment, Operand, Param, Predicate};
pub use update::{Assignment, SqlExpr, UpdateMap};

use crate::error::ValueError;
use crate::reflect::{FieldValue, Reflect};

/// Follows a descriptor path through flattened structs to the leaf value.
pub(crate) fn resolve<'a>(
    root: &'a dyn Reflect,
    path: &[usize],
) -> Result<FieldValue<'a>, ValueError> {
    let (&last, parents) = path
        .split_last()
        .ok_or(ValueError::FieldIndex { index: 0 })?;

    let mut current = root;
    for &index in parents {
        current = match current.field(index)? {
            FieldValue::Flatten(inner) => inner,
            _ => return Err(ValueError::FieldIndex { index }),
        };
    }
    current.field(last)
}
