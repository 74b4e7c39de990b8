//! Shared `Reflect` generation for `Where` and `Update`
//!
//! Each field becomes one `FieldDecl` plus one arm of the `field` accessor.
//! The accessor helper is chosen from the operator (where) or expression
//! (update) and the field's syntactic shape.

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Field, Fields, Ident, LitStr};

use crate::attributes::{self, FieldAttrs};
use crate::utils::{self, Shape};

const OPERATORS: &[&str] = &[
    "=",
    "!=",
    "<",
    "<=",
    ">",
    ">=",
    "in",
    "not in",
    "like",
    "left like",
    "right like",
    "full like",
    "null",
    "json_contains",
    "json_contains any",
    "json_contains all",
];

const EXPRS: &[&str] = &["+", "-", "json_set", "merge_json"];

const OR_GROUP: &str = "$or";

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Where,
    Update,
}

impl Mode {
    fn derive_name(self) -> &'static str {
        match self {
            Mode::Where => "Where",
            Mode::Update => "Update",
        }
    }
}

/// Generates `impl ::tagdal::Reflect` for a struct with named fields.
pub fn expand_reflect(input: &DeriveInput, mode: Mode) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            format!("{} can not be derived for generic structs", mode.derive_name()),
        ));
    }

    let fields = match &input.data {
        Data::Struct(syn::DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                format!(
                    "{} can only be derived for structs with named fields",
                    mode.derive_name()
                ),
            ))
        }
    };

    let mut decls = Vec::new();
    let mut arms = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let (decl, accessor) = plan_field(field, struct_name, mode)?;
        decls.push(decl);
        arms.push(quote! { #index => #accessor, });
    }

    Ok(quote! {
        impl ::tagdal::Reflect for #struct_name {
            fn fields() -> &'static [::tagdal::FieldDecl] {
                const FIELDS: &[::tagdal::FieldDecl] = &[#(#decls),*];
                FIELDS
            }

            fn field(
                &self,
                index: usize,
            ) -> ::core::result::Result<::tagdal::FieldValue<'_>, ::tagdal::ValueError> {
                match index {
                    #(#arms)*
                    _ => ::core::result::Result::Err(::tagdal::ValueError::FieldIndex { index }),
                }
            }
        }
    })
}

fn plan_field(
    field: &Field,
    struct_name: &Ident,
    mode: Mode,
) -> syn::Result<(TokenStream2, TokenStream2)> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let name = ident.unraw().to_string();
    let attrs = attributes::parse_field_attrs(field)?;

    if let Some(column) = &attrs.column {
        return Err(syn::Error::new_spanned(
            column,
            "`column` is only supported by #[derive(Record)], use `field`",
        ));
    }

    let mapping = attrs.mapping();
    let operator = attrs.operator();
    let expr = attrs.expr();

    if expr.as_deref() == Some(OR_GROUP) {
        return plan_or_group(field, ident, &name, &attrs, struct_name);
    }

    if mapping.as_deref() == Some("-") {
        let decl = decl_tokens(&name, Some("-"), None, None, quote!(::tagdal::FieldKind::Required));
        return Ok((decl, quote!(::core::result::Result::Ok(::tagdal::FieldValue::Unset))));
    }

    if attrs.flatten {
        if let Some(m) = &mapping {
            return Err(syn::Error::new_spanned(
                field,
                format!("field({}) is flattened and can not have a field tag ({})", name, m),
            ));
        }
        let ty = &field.ty;
        let kind = quote! {
            ::tagdal::FieldKind::Flatten(::tagdal::Embedded {
                type_name: ::core::stringify!(#ty),
                fields: <#ty as ::tagdal::Reflect>::fields,
            })
        };
        let decl = decl_tokens(&name, None, None, None, kind);
        return Ok((
            decl,
            quote!(::core::result::Result::Ok(::tagdal::FieldValue::flatten(&self.#ident))),
        ));
    }

    let mapping = mapping.ok_or_else(|| {
        syn::Error::new_spanned(ident, format!("struct field({}) need field tag", name))
    })?;
    check_token(attrs.operator.as_ref(), &name, "operator", operator.as_deref(), OPERATORS)?;
    check_token(attrs.expr.as_ref(), &name, "expr", expr.as_deref(), EXPRS)?;

    let shape = utils::shape(&field.ty);
    let helper = match mode {
        Mode::Where => where_helper(operator.as_deref().unwrap_or("="), &shape),
        Mode::Update => update_helper(expr.as_deref().unwrap_or(""), &shape),
    };
    let (helper, kind) = helper.ok_or_else(|| {
        syn::Error::new_spanned(
            &field.ty,
            format!(
                "struct field({}) must be optional, but got {}; use Option<T>{}",
                name,
                shape.describe(),
                if mode == Mode::Where && matches!(operator.as_deref(), Some("in" | "not in" | "json_contains any" | "json_contains all")) {
                    ", Vec<T> or Option<Vec<T>>"
                } else {
                    ""
                }
            ),
        )
    })?;

    let accessor = match helper {
        Helper::Scalar => quote!(::core::result::Result::Ok(::tagdal::FieldValue::scalar(&self.#ident))),
        Helper::List => quote!(::core::result::Result::Ok(::tagdal::FieldValue::list(&self.#ident))),
        Helper::OptionalList => {
            quote!(::core::result::Result::Ok(::tagdal::FieldValue::optional_list(&self.#ident)))
        }
        Helper::Json => quote!(::tagdal::FieldValue::json(#name, &self.#ident)),
        Helper::MergeJson => quote!(::tagdal::FieldValue::merge_json(#name, &self.#ident)),
        Helper::JsonCollection => quote!(::tagdal::FieldValue::json_collection(#name, &self.#ident)),
        Helper::JsonList => quote!(::tagdal::FieldValue::json_list(#name, &self.#ident)),
        Helper::OptionalJsonList => {
            quote!(::tagdal::FieldValue::optional_json_list(#name, &self.#ident))
        }
    };

    let decl = decl_tokens(
        &name,
        Some(&mapping),
        operator.as_deref(),
        expr.as_deref(),
        kind.tokens(),
    );
    Ok((decl, accessor))
}

fn plan_or_group(
    field: &Field,
    ident: &Ident,
    name: &str,
    attrs: &FieldAttrs,
    struct_name: &Ident,
) -> syn::Result<(TokenStream2, TokenStream2)> {
    let mapping = attrs.mapping();
    if let Some(m) = mapping.as_deref().filter(|m| *m != "-") {
        return Err(syn::Error::new_spanned(
            &attrs.field,
            format!(
                "struct field({}) with mix of field({}) and expr($or) invalid",
                name, m
            ),
        ));
    }
    if attrs.flatten {
        return Err(syn::Error::new_spanned(
            field,
            "a flattened field can not be an or-group",
        ));
    }

    let (kind, accessor) = match utils::shape(&field.ty) {
        Shape::Vec(elem) if utils::is_self_type(elem, struct_name) => (
            Kind::Collection,
            quote!(::core::result::Result::Ok(::tagdal::FieldValue::group(&self.#ident))),
        ),
        Shape::OptionVec(elem) if utils::is_self_type(elem, struct_name) => (
            Kind::OptionalCollection,
            quote!(::core::result::Result::Ok(::tagdal::FieldValue::optional_group(&self.#ident))),
        ),
        _ => {
            return Err(syn::Error::new_spanned(
                &field.ty,
                format!(
                    "field({}) with expr($or) must be Vec<{}> or Option<Vec<{}>>",
                    name, struct_name, struct_name
                ),
            ))
        }
    };

    let decl = decl_tokens(
        name,
        mapping.as_deref(),
        attrs.operator().as_deref(),
        Some(OR_GROUP),
        kind.tokens(),
    );
    Ok((decl, accessor))
}

fn check_token(
    lit: Option<&LitStr>,
    name: &str,
    what: &str,
    token: Option<&str>,
    known: &[&str],
) -> syn::Result<()> {
    match (lit, token) {
        (Some(lit), Some(t)) if !known.contains(&t) => Err(syn::Error::new_spanned(
            lit,
            format!("field({}) {}({}) invalid", name, what, t),
        )),
        _ => Ok(()),
    }
}

enum Helper {
    Scalar,
    List,
    OptionalList,
    Json,
    MergeJson,
    JsonCollection,
    JsonList,
    OptionalJsonList,
}

enum Kind {
    Optional,
    Collection,
    OptionalCollection,
}

impl Kind {
    fn tokens(&self) -> TokenStream2 {
        match self {
            Kind::Optional => quote!(::tagdal::FieldKind::Optional),
            Kind::Collection => quote!(::tagdal::FieldKind::Collection),
            Kind::OptionalCollection => quote!(::tagdal::FieldKind::OptionalCollection),
        }
    }
}

fn where_helper(operator: &str, shape: &Shape<'_>) -> Option<(Helper, Kind)> {
    match (operator, shape) {
        ("in" | "not in", Shape::Vec(_)) => Some((Helper::List, Kind::Collection)),
        ("in" | "not in", Shape::OptionVec(_)) => Some((Helper::OptionalList, Kind::OptionalCollection)),
        ("in" | "not in", _) => None,
        ("json_contains", Shape::Option | Shape::OptionVec(_)) => Some((Helper::Json, Kind::Optional)),
        ("json_contains", Shape::Vec(_)) => Some((Helper::JsonCollection, Kind::Collection)),
        ("json_contains any" | "json_contains all", Shape::Vec(_)) => {
            Some((Helper::JsonList, Kind::Collection))
        }
        ("json_contains any" | "json_contains all", Shape::OptionVec(_)) => {
            Some((Helper::OptionalJsonList, Kind::OptionalCollection))
        }
        ("json_contains any" | "json_contains all", _) => None,
        (_, Shape::Option | Shape::OptionVec(_)) => Some((Helper::Scalar, Kind::Optional)),
        _ => None,
    }
}

fn update_helper(expr: &str, shape: &Shape<'_>) -> Option<(Helper, Kind)> {
    match (expr, shape) {
        ("json_set", Shape::Option | Shape::OptionVec(_)) => Some((Helper::Json, Kind::Optional)),
        ("merge_json", Shape::Option | Shape::OptionVec(_)) => {
            Some((Helper::MergeJson, Kind::Optional))
        }
        ("json_set" | "merge_json", _) => None,
        (_, Shape::Option | Shape::OptionVec(_)) => Some((Helper::Scalar, Kind::Optional)),
        _ => None,
    }
}

fn decl_tokens(
    name: &str,
    field: Option<&str>,
    operator: Option<&str>,
    expr: Option<&str>,
    kind: TokenStream2,
) -> TokenStream2 {
    let field = option_tokens(field);
    let operator = option_tokens(operator);
    let expr = option_tokens(expr);
    quote! {
        ::tagdal::FieldDecl {
            name: #name,
            field: #field,
            operator: #operator,
            expr: #expr,
            kind: #kind,
        }
    }
}

fn option_tokens(value: Option<&str>) -> TokenStream2 {
    match value {
        Some(v) => quote!(::core::option::Option::Some(#v)),
        None => quote!(::core::option::Option::None),
    }
}
