//! Parsed, validated type descriptors.
//!
//! A [`TypeDescriptor`] is the flattened column list of one model type. It is
//! built once per type by [`parse_type`] and shared through the
//! [`Registry`](crate::Registry).

pub mod token;
mod validate;

use crate::error::SchemaError;
use crate::reflect::{FieldDecl, FieldKind};
use std::collections::HashMap;

pub use token::{Assign, Operator, OR_GROUP, SKIP};

/// One mapped leaf field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Rust field name.
    pub name: &'static str,
    /// Column name.
    pub field: &'static str,
    pub operator: Operator,
    pub assign: Assign,
    pub is_collection: bool,
    path: Vec<usize>,
}

impl ColumnDescriptor {
    /// Field indices from the root type down to this field, through flattened
    /// structs.
    pub fn path(&self) -> &[usize] {
        &self.path
    }
}

/// Ordered, flattened columns of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    type_name: &'static str,
    columns: Vec<ColumnDescriptor>,
    by_name: HashMap<&'static str, usize>,
}

impl TypeDescriptor {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Looks a column up by its Rust field name.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.by_name.get(name).map(|&i| &self.columns[i])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A top-level OR-group field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrGroupField {
    pub name: &'static str,
    pub index: usize,
}

/// The OR-group fields of one type, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrGroupDescriptor {
    fields: Vec<OrGroupField>,
}

impl OrGroupDescriptor {
    pub fn fields(&self) -> &[OrGroupField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builds the descriptor for a type from its field declarations.
///
/// Flattened fields are expanded in place. A field whose name was already
/// seen is replaced and moves to the end of the column list.
///
/// # Errors
///
/// Returns the first [`SchemaError`] found, in declaration order.
pub fn parse_type(
    type_name: &'static str,
    fields: &'static [FieldDecl],
) -> Result<TypeDescriptor, SchemaError> {
    let mut columns = Vec::new();
    collect(fields, &[], &mut columns)?;

    let by_name = columns
        .iter()
        .enumerate()
        .map(|(i, c): (usize, &ColumnDescriptor)| (c.name, i))
        .collect();

    Ok(TypeDescriptor {
        type_name,
        columns,
        by_name,
    })
}

fn collect(
    fields: &'static [FieldDecl],
    prefix: &[usize],
    out: &mut Vec<ColumnDescriptor>,
) -> Result<(), SchemaError> {
    for (index, decl) in fields.iter().enumerate() {
        let mapping = token::normalize(decl.field);
        let or_group = token::normalize(decl.expr) == Some(OR_GROUP);

        match (mapping, or_group) {
            (Some(SKIP), _) | (None, true) => continue,
            (Some(mapping), true) => {
                return Err(SchemaError::MixedTag {
                    field: decl.name,
                    mapping,
                })
            }
            _ => {}
        }

        let mut path = prefix.to_vec();
        path.push(index);

        if let FieldKind::Flatten(embedded) = decl.kind {
            validate::check_flatten(decl, mapping)?;
            collect((embedded.fields)(), &path, out)?;
            continue;
        }

        let field = mapping.ok_or(SchemaError::MissingMapping { field: decl.name })?;
        let operator = validate::check_operator(decl)?;
        let assign = validate::check_expr(decl)?;
        validate::check_shape(decl, operator)?;

        out.retain(|c| c.name != decl.name);
        out.push(ColumnDescriptor {
            name: decl.name,
            field,
            operator,
            assign,
            is_collection: decl.kind.is_collection(),
            path,
        });
    }
    Ok(())
}

/// Collects the top-level OR-group fields of a type.
///
/// Only the root type is scanned; OR-group fields inside flattened structs
/// are ignored.
pub fn parse_or_groups(fields: &'static [FieldDecl]) -> Result<OrGroupDescriptor, SchemaError> {
    let mut groups = Vec::new();
    for (index, decl) in fields.iter().enumerate() {
        let mapping = token::normalize(decl.field);
        let or_group = token::normalize(decl.expr) == Some(OR_GROUP);
        if !or_group || !matches!(mapping, None | Some(SKIP)) {
            continue;
        }
        validate::check_or_group(decl)?;
        groups.push(OrGroupField {
            name: decl.name,
            index,
        });
    }
    Ok(OrGroupDescriptor { fields: groups })
}
