//! Derive macro for `Update`

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use super::reflect::{expand_reflect, Mode};
use crate::attributes;

pub fn derive_update(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let struct_name = &input.ident;

    let reflect = match expand_reflect(&input, Mode::Update) {
        Ok(tokens) => tokens,
        Err(err) => return err.to_compile_error().into(),
    };
    match attributes::parse_struct_attrs(&input.attrs) {
        Ok(attrs) if attrs.force_index.is_some() || attrs.defaults.is_some() => {
            return syn::Error::new_spanned(
                struct_name,
                "`force_index` and `defaults` are only supported by #[derive(Where)]",
            )
            .to_compile_error()
            .into();
        }
        Ok(_) => {}
        Err(err) => return err.to_compile_error().into(),
    }

    let expanded = quote! {
        #reflect

        impl ::tagdal::UpdateModel for #struct_name {}
    };
    TokenStream::from(expanded)
}
