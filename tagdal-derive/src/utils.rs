//! Utility functions for code generation

use syn::{GenericArgument, PathArguments, Type};

/// Convert string to snake_case
pub fn snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            result.push('_');
        }
        result.extend(c.to_lowercase());
    }
    result
}

/// Structural shape of a field type.
pub enum Shape<'a> {
    /// `Option<T>` where `T` is not a `Vec`
    Option,
    /// `Vec<T>`
    Vec(&'a Type),
    /// `Option<Vec<T>>`
    OptionVec(&'a Type),
    Other,
}

impl Shape<'_> {
    pub fn describe(&self) -> &'static str {
        match self {
            Shape::Option => "optional value",
            Shape::Vec(_) => "collection",
            Shape::OptionVec(_) => "optional collection",
            Shape::Other => "required value",
        }
    }
}

pub fn shape(ty: &Type) -> Shape<'_> {
    if let Some(inner) = generic_arg(ty, "Option") {
        return match generic_arg(inner, "Vec") {
            Some(elem) => Shape::OptionVec(elem),
            None => Shape::Option,
        };
    }
    match generic_arg(ty, "Vec") {
        Some(elem) => Shape::Vec(elem),
        None => Shape::Other,
    }
}

/// The single type argument of `Name<T>`, matched on the last path segment.
fn generic_arg<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Whether `ty` names the struct being derived (`Self` or its identifier).
pub fn is_self_type(ty: &Type, ident: &syn::Ident) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .map(|s| s.ident == "Self" || s.ident == *ident)
            .unwrap_or(false),
        _ => false,
    }
}
