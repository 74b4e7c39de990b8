//! Attribute parsing utilities

use syn::{Attribute, Field, LitStr};

/// `#[sql(...)]` on a field.
#[derive(Default)]
pub struct FieldAttrs {
    pub field: Option<LitStr>,
    pub operator: Option<LitStr>,
    pub expr: Option<LitStr>,
    pub column: Option<LitStr>,
    pub skip: bool,
    pub flatten: bool,
}

impl FieldAttrs {
    /// Column mapping, with `skip` folded into `"-"`.
    pub fn mapping(&self) -> Option<String> {
        if self.skip {
            return Some("-".to_string());
        }
        trimmed(&self.field)
    }

    pub fn operator(&self) -> Option<String> {
        trimmed(&self.operator)
    }

    pub fn expr(&self) -> Option<String> {
        trimmed(&self.expr)
    }
}

/// `#[sql(...)]` on a struct.
#[derive(Default)]
pub struct StructAttrs {
    pub table: Option<LitStr>,
    pub primary_key: Option<LitStr>,
    pub force_index: Option<LitStr>,
    pub defaults: Option<syn::Path>,
}

fn trimmed(lit: &Option<LitStr>) -> Option<String> {
    lit.as_ref()
        .map(|s| s.value().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse every `#[sql(...)]` attribute of a field
pub fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("sql") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("field") {
                out.field = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("operator") {
                out.operator = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("expr") {
                out.expr = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("column") {
                out.column = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else {
                return Err(meta.error(
                    "unsupported sql attribute, expected one of: field, operator, expr, column, skip, flatten",
                ));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

/// Parse every `#[sql(...)]` attribute of a struct
pub fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("sql") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                out.table = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("primary_key") {
                out.primary_key = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("force_index") {
                out.force_index = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("defaults") {
                let lit: LitStr = meta.value()?.parse()?;
                out.defaults = Some(lit.parse()?);
            } else {
                return Err(meta.error(
                    "unsupported sql attribute, expected one of: table, primary_key, force_index, defaults",
                ));
            }
            Ok(())
        })?;
    }
    Ok(out)
}
