//! Procedural macros for tagdal
//!
//! This crate provides the `Where`, `Update` and `Record` derives. They turn
//! `#[sql(...)]` field attributes into static field declarations and value
//! accessors; the runtime validates the declarations again when a type is
//! first registered.

mod attributes;
mod macros;
mod utils;

use proc_macro::TokenStream;

/// Derive macro for `Where` - compiles a condition struct into a predicate
///
/// Field attributes:
/// - `#[sql(field = "col", operator = ">")]`: compare `col` with the field value
/// - `#[sql(expr = "$or")]`: a `Vec<Self>` / `Option<Vec<Self>>` of OR-ed sub-conditions
/// - `#[sql(flatten)]`: merge the fields of another `Where` struct
/// - `#[sql(skip)]`: ignore the field
///
/// Struct attributes: `#[sql(force_index = "idx")]`, `#[sql(defaults = "path::to::fn")]`.
///
/// Fields must be `Option<T>`; `in`, `not in` and `json_contains*` also accept `Vec<T>`.
#[proc_macro_derive(Where, attributes(sql))]
pub fn derive_where(input: TokenStream) -> TokenStream {
    macros::derive_where(input)
}

/// Derive macro for `Update` - compiles an update struct into column assignments
///
/// `#[sql(field = "balance", expr = "+")]` emits `` `balance` = `balance` + ? ``.
/// Supported expressions: `+`, `-`, `json_set`, `merge_json`.
#[proc_macro_derive(Update, attributes(sql))]
pub fn derive_update(input: TokenStream) -> TokenStream {
    macros::derive_update(input)
}

/// Derive macro for `Record` - maps a persistent object to a table
///
/// This macro generates:
/// - `Record` implementation (table name, columns, insert values, `from_row`)
/// - `Selectable` implementation, so `Registry::columns_of` accepts the type
///
/// Struct attributes: `#[sql(table = "users")]` (defaults to the snake_case
/// struct name), `#[sql(primary_key = "user_id")]`. Field attributes:
/// `#[sql(column = "name")]`, `#[sql(skip)]`.
#[proc_macro_derive(Record, attributes(sql))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    macros::derive_record(input)
}
