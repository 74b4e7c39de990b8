//! Persistent-object records and the selector helper.
//!
//! A [`Record`] maps one table row. [`Selectable`] resolves containers of a
//! record (references, boxes, slices, `Vec`, `Option`, `Arc`) to the record
//! type so [`Registry::columns_of`](crate::Registry::columns_of) can list its
//! columns.

use crate::executor::Row;
use crate::error::Result;
use sea_query::Value;
use std::sync::Arc;

/// A mapped column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDecl {
    /// Rust field name.
    pub name: &'static str,
    /// Column name.
    pub column: &'static str,
}

/// A persistent object mapped to one table.
///
/// Usually derived with `#[derive(Record)]`.
pub trait Record: Sized + Send + Sync + 'static {
    fn table_name() -> &'static str;

    /// Column used by the `*_by_id` operations.
    fn primary_key() -> &'static str {
        "id"
    }

    fn columns() -> &'static [ColumnDecl];

    /// Values in [`Record::columns`] order, for inserts.
    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row) -> Result<Self>;
}

/// Types whose rows are described by a [`Record`].
pub trait Selectable {
    type Record: Record;
}

impl<S: Selectable + ?Sized> Selectable for &S {
    type Record = S::Record;
}

impl<S: Selectable + ?Sized> Selectable for Box<S> {
    type Record = S::Record;
}

impl<S: Selectable + ?Sized> Selectable for Arc<S> {
    type Record = S::Record;
}

impl<S: Selectable> Selectable for Vec<S> {
    type Record = S::Record;
}

impl<S: Selectable> Selectable for [S] {
    type Record = S::Record;
}

impl<S: Selectable, const N: usize> Selectable for [S; N] {
    type Record = S::Record;
}

impl<S: Selectable> Selectable for Option<S> {
    type Record = S::Record;
}
