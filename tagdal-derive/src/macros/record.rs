//! Derive macro for `Record`
//!
//! Generates the column list, insert values and row decoding of a persistent
//! object, plus `Selectable` so containers of it resolve to the record.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use crate::attributes;
use crate::utils;

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_record(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_record(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record can not be derived for generic structs",
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
                "Record can only be derived for structs with named fields",
            ))
        }
    };

    let struct_attrs = attributes::parse_struct_attrs(&input.attrs)?;
    let table_name = struct_attrs
        .table
        .map(|t| t.value())
        .unwrap_or_else(|| utils::snake_case(&struct_name.to_string()));
    let primary_key = struct_attrs.primary_key.map(|pk| {
        quote! {
            fn primary_key() -> &'static str {
                #pk
            }
        }
    });

    let mut columns = Vec::new();
    let mut values = Vec::new();
    let mut from_row = Vec::new();

    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let attrs = attributes::parse_field_attrs(field)?;

        if attrs.field.is_some() || attrs.operator.is_some() || attrs.expr.is_some() || attrs.flatten {
            return Err(syn::Error::new_spanned(
                field,
                "Record fields support only `column` and `skip`",
            ));
        }

        if attrs.skip {
            from_row.push(quote! { #ident: ::core::default::Default::default(), });
            continue;
        }

        let name = ident.unraw().to_string();
        let column = attrs
            .column
            .map(|c| c.value())
            .unwrap_or_else(|| name.clone());

        columns.push(quote! {
            ::tagdal::ColumnDecl { name: #name, column: #column }
        });
        values.push(quote! {
            ::tagdal::sea_query::Value::from(::core::clone::Clone::clone(&self.#ident))
        });
        from_row.push(quote! { #ident: row.get(#column)?, });
    }

    Ok(quote! {
        impl ::tagdal::Record for #struct_name {
            fn table_name() -> &'static str {
                #table_name
            }

            #primary_key

            fn columns() -> &'static [::tagdal::ColumnDecl] {
                const COLUMNS: &[::tagdal::ColumnDecl] = &[#(#columns),*];
                COLUMNS
            }

            fn values(&self) -> ::std::vec::Vec<::tagdal::sea_query::Value> {
                ::std::vec![#(#values),*]
            }

            fn from_row(row: &::tagdal::Row) -> ::tagdal::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#from_row)*
                })
            }
        }

        impl ::tagdal::Selectable for #struct_name {
            type Record = Self;
        }
    })
}
