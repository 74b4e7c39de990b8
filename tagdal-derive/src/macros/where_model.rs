//! Derive macro for `Where`

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use super::reflect::{expand_reflect, Mode};
use crate::attributes;

pub fn derive_where(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let struct_name = &input.ident;

    let reflect = match expand_reflect(&input, Mode::Where) {
        Ok(tokens) => tokens,
        Err(err) => return err.to_compile_error().into(),
    };
    let struct_attrs = match attributes::parse_struct_attrs(&input.attrs) {
        Ok(attrs) => attrs,
        Err(err) => return err.to_compile_error().into(),
    };
    if let Some(table) = struct_attrs.table.as_ref().or(struct_attrs.primary_key.as_ref()) {
        return syn::Error::new_spanned(
            table,
            "`table` and `primary_key` are only supported by #[derive(Record)]",
        )
        .to_compile_error()
        .into();
    }

    let force_index = struct_attrs.force_index.map(|index| {
        quote! {
            fn force_index(&self) -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(#index)
            }
        }
    });
    let inject_defaults = struct_attrs.defaults.map(|path| {
        quote! {
            fn inject_defaults(&mut self) {
                #path(self)
            }
        }
    });

    let expanded = quote! {
        #reflect

        impl ::tagdal::WhereModel for #struct_name {
            #force_index
            #inject_defaults
        }
    };
    TokenStream::from(expanded)
}
