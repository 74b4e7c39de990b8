//! Static field declarations and per-instance field access.
//!
//! A model type describes its fields once through [`Reflect::fields`] and
//! hands out individual values through [`Reflect::field`]. The derives in
//! `tagdal-derive` generate both; hand-written impls are validated the same
//! way when the type is registered.
//!
//! # Examples
//!
//! ```
//! use tagdal::{FieldDecl, FieldKind, FieldValue, Reflect, ValueError, WhereModel};
//!
//! struct ByName {
//!     name: Option<String>,
//! }
//!
//! impl Reflect for ByName {
//!     fn fields() -> &'static [FieldDecl] {
//!         const FIELDS: &[FieldDecl] =
//!             &[FieldDecl::new("name", FieldKind::Optional).column("name")];
//!         FIELDS
//!     }
//!
//!     fn field(&self, index: usize) -> Result<FieldValue<'_>, ValueError> {
//!         match index {
//!             0 => Ok(FieldValue::scalar(&self.name)),
//!             _ => Err(ValueError::FieldIndex { index }),
//!         }
//!     }
//! }
//!
//! impl WhereModel for ByName {}
//! ```

use crate::error::ValueError;
use crate::value::{SqlArg, SqlValue};
use sea_query::Value;
use serde::{ser, Serialize};

/// Declaration of one struct field and its tags.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecl {
    /// Rust field name, used in error messages.
    pub name: &'static str,
    /// Column mapping; `Some("-")` excludes the field.
    pub field: Option<&'static str>,
    /// Comparison operator token.
    pub operator: Option<&'static str>,
    /// Assignment expression token, or `$or`.
    pub expr: Option<&'static str>,
    pub kind: FieldKind,
}

impl FieldDecl {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            field: None,
            operator: None,
            expr: None,
            kind,
        }
    }

    pub const fn column(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub const fn operator(mut self, operator: &'static str) -> Self {
        self.operator = Some(operator);
        self
    }

    pub const fn expr(mut self, expr: &'static str) -> Self {
        self.expr = Some(expr);
        self
    }
}

/// Structural shape of a declared field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// `Option<T>`: `None` means not specified.
    Optional,
    /// `Vec<T>`: empty means not specified.
    Collection,
    /// `Option<Vec<T>>`: `None` means not specified, `Some(vec![])` is a value.
    OptionalCollection,
    /// Any other type. Can not express "not specified".
    Required,
    /// Fields of another type merged into this one.
    Flatten(Embedded),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Optional => "optional value",
            FieldKind::Collection => "collection",
            FieldKind::OptionalCollection => "optional collection",
            FieldKind::Required => "required value",
            FieldKind::Flatten(_) => "flattened struct",
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, FieldKind::Collection | FieldKind::OptionalCollection)
    }
}

/// A flattened field's type.
#[derive(Debug, Clone, Copy)]
pub struct Embedded {
    pub type_name: &'static str,
    pub fields: fn() -> &'static [FieldDecl],
}

/// The current value of one field.
pub enum FieldValue<'a> {
    /// Not specified; contributes nothing.
    Unset,
    Scalar(crate::value::Arg),
    List(Vec<Value>),
    /// A document for `json_contains`, `json_set` and `merge_json`.
    Json(serde_json::Value),
    /// One document per element for `json_contains any` / `all`.
    JsonList(Vec<serde_json::Value>),
    Flatten(&'a dyn Reflect),
    Group(Vec<&'a dyn Reflect>),
}

impl<'a> FieldValue<'a> {
    pub fn scalar<T: SqlArg>(value: &Option<T>) -> Self {
        match value {
            Some(v) => FieldValue::Scalar(v.to_arg()),
            None => FieldValue::Unset,
        }
    }

    /// A bare collection; empty means not specified.
    pub fn list<T: SqlValue>(values: &[T]) -> Self {
        if values.is_empty() {
            return FieldValue::Unset;
        }
        FieldValue::List(values.iter().map(SqlValue::to_value).collect())
    }

    /// An optional collection; `Some(vec![])` is kept as an empty list.
    pub fn optional_list<T: SqlValue>(values: &Option<Vec<T>>) -> Self {
        match values {
            Some(v) => FieldValue::List(v.iter().map(SqlValue::to_value).collect()),
            None => FieldValue::Unset,
        }
    }

    pub fn json<T: Serialize>(field: &'static str, value: &Option<T>) -> Result<Self, ValueError> {
        match value {
            Some(v) => Ok(FieldValue::Json(encode(field, v)?)),
            None => Ok(FieldValue::Unset),
        }
    }

    /// A `merge_json` document. Unset fields of a struct are dropped, and a
    /// struct with no set field is unset. Maps and JSON values keep their
    /// nulls, which `JSON_MERGE_PATCH` reads as key removal.
    pub fn merge_json<T: Serialize>(
        field: &'static str,
        value: &Option<T>,
    ) -> Result<Self, ValueError> {
        let Some(v) = value else {
            return Ok(FieldValue::Unset);
        };
        let doc = encode(field, v)?;
        if !serializes_as_struct(v) {
            return Ok(FieldValue::Json(doc));
        }
        match doc {
            serde_json::Value::Object(object) => {
                let object: serde_json::Map<_, _> =
                    object.into_iter().filter(|(_, v)| !v.is_null()).collect();
                if object.is_empty() {
                    Ok(FieldValue::Unset)
                } else {
                    Ok(FieldValue::Json(serde_json::Value::Object(object)))
                }
            }
            other => Ok(FieldValue::Json(other)),
        }
    }

    /// A bare collection encoded as one JSON array; empty means not specified.
    pub fn json_collection<T: Serialize>(
        field: &'static str,
        values: &[T],
    ) -> Result<Self, ValueError> {
        if values.is_empty() {
            return Ok(FieldValue::Unset);
        }
        Ok(FieldValue::Json(encode(field, values)?))
    }

    pub fn json_list<T: Serialize>(field: &'static str, values: &[T]) -> Result<Self, ValueError> {
        if values.is_empty() {
            return Ok(FieldValue::Unset);
        }
        let docs = values
            .iter()
            .map(|v| encode(field, v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldValue::JsonList(docs))
    }

    pub fn optional_json_list<T: Serialize>(
        field: &'static str,
        values: &Option<Vec<T>>,
    ) -> Result<Self, ValueError> {
        match values {
            Some(v) => {
                let docs = v
                    .iter()
                    .map(|item| encode(field, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FieldValue::JsonList(docs))
            }
            None => Ok(FieldValue::Unset),
        }
    }

    pub fn flatten<R: Reflect>(value: &'a R) -> Self {
        FieldValue::Flatten(value)
    }

    pub fn group<R: Reflect>(values: &'a [R]) -> Self {
        FieldValue::Group(values.iter().map(|v| v as &dyn Reflect).collect())
    }

    pub fn optional_group<R: Reflect>(values: &'a Option<Vec<R>>) -> Self {
        match values {
            Some(v) => Self::group(v),
            None => FieldValue::Unset,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Unset)
    }

    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Unset => "nothing",
            FieldValue::Scalar(arg) => arg.kind(),
            FieldValue::List(_) => "list",
            FieldValue::Json(_) => "json document",
            FieldValue::JsonList(_) => "json document list",
            FieldValue::Flatten(_) => "flattened struct",
            FieldValue::Group(_) => "or-group",
        }
    }
}

fn encode<T: Serialize + ?Sized>(
    field: &'static str,
    value: &T,
) -> Result<serde_json::Value, ValueError> {
    serde_json::to_value(value).map_err(|source| ValueError::JsonEncode { field, source })
}

/// Whether `value` serializes through `serialize_struct`, looking through
/// `Option` and newtype wrappers.
fn serializes_as_struct<T: Serialize + ?Sized>(value: &T) -> bool {
    matches!(value.serialize(StructDetector), Err(Detected::Struct))
}

/// Serializer that stops at the first call and reports whether it was a struct.
struct StructDetector;

#[derive(Debug)]
enum Detected {
    Struct,
    Other,
}

impl std::fmt::Display for Detected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detected::Struct => f.write_str("struct"),
            Detected::Other => f.write_str("not a struct"),
        }
    }
}

impl std::error::Error for Detected {}

impl ser::Error for Detected {
    fn custom<M: std::fmt::Display>(_msg: M) -> Self {
        Detected::Other
    }
}

macro_rules! not_a_struct {
    ($($method:ident($($arg:ty),*);)*) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<(), Detected> {
                Err(Detected::Other)
            }
        )*
    };
}

impl ser::Serializer for StructDetector {
    type Ok = ();
    type Error = Detected;
    type SerializeSeq = ser::Impossible<(), Detected>;
    type SerializeTuple = ser::Impossible<(), Detected>;
    type SerializeTupleStruct = ser::Impossible<(), Detected>;
    type SerializeTupleVariant = ser::Impossible<(), Detected>;
    type SerializeMap = ser::Impossible<(), Detected>;
    type SerializeStruct = ser::Impossible<(), Detected>;
    type SerializeStructVariant = ser::Impossible<(), Detected>;

    not_a_struct! {
        serialize_bool(bool);
        serialize_i8(i8);
        serialize_i16(i16);
        serialize_i32(i32);
        serialize_i64(i64);
        serialize_u8(u8);
        serialize_u16(u16);
        serialize_u32(u32);
        serialize_u64(u64);
        serialize_f32(f32);
        serialize_f64(f64);
        serialize_char(char);
        serialize_str(&str);
        serialize_bytes(&[u8]);
        serialize_none();
        serialize_unit();
        serialize_unit_struct(&'static str);
        serialize_unit_variant(&'static str, u32, &'static str);
    }

    fn serialize_some<V: Serialize + ?Sized>(self, value: &V) -> Result<(), Detected> {
        value.serialize(self)
    }

    fn serialize_newtype_struct<V: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &V,
    ) -> Result<(), Detected> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<V: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &V,
    ) -> Result<(), Detected> {
        Err(Detected::Other)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Detected> {
        Err(Detected::Other)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Detected> {
        Err(Detected::Other)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Detected> {
        Err(Detected::Other)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Detected> {
        Err(Detected::Other)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Detected> {
        Err(Detected::Other)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Detected> {
        Err(Detected::Struct)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Detected> {
        Err(Detected::Other)
    }
}

/// Field declarations plus instance access.
pub trait Reflect: Send + Sync + 'static {
    fn fields() -> &'static [FieldDecl]
    where
        Self: Sized;

    /// Value of the field declared at `index` in [`Reflect::fields`].
    fn field(&self, index: usize) -> Result<FieldValue<'_>, ValueError>;
}

/// A struct compiled into a WHERE predicate.
pub trait WhereModel: Reflect {
    /// Index hint applied by the façade when selecting.
    fn force_index(&self) -> Option<&'static str> {
        None
    }

    /// Fills defaults before the value is compiled.
    fn inject_defaults(&mut self) {}
}

/// A struct compiled into an update map.
pub trait UpdateModel: Reflect {}
