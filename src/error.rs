//! Error types for schema registration, compilation and execution.
//!
//! Three classes are kept apart:
//! - [`SchemaError`]: a declaration is inconsistent. Permanent for the type, so
//!   the registry caches it and every later call fails the same way.
//! - [`ValueError`]: a particular instance can not be compiled.
//! - Caller misuse and façade failures, carried directly by [`Error`].

use thiserror::Error;

/// Type-level declaration errors, detected once per type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An OR-group marker was combined with a column mapping.
    #[error("struct field({field}) with mix of field({mapping}) and expr($or) invalid")]
    MixedTag {
        field: &'static str,
        mapping: &'static str,
    },
    /// A leaf field has no column mapping.
    #[error("struct field({field}) need field tag")]
    MissingMapping { field: &'static str },
    /// Unknown comparison operator token.
    #[error("field({field}) operator({token}) invalid")]
    InvalidOperator {
        field: &'static str,
        token: &'static str,
    },
    /// Unknown assignment expression token.
    #[error("field({field}) expr({token}) invalid")]
    InvalidExpr {
        field: &'static str,
        token: &'static str,
    },
    /// The field shape can not express "not specified".
    #[error("struct field({field}) must be optional, but got {kind}")]
    MustBeOptional {
        field: &'static str,
        kind: &'static str,
    },
    /// A flattened field carries its own column mapping.
    #[error("field({field}) is flattened and can not have a field tag")]
    EmbeddedWithMapping { field: &'static str },
    /// An OR-group field is not a collection.
    #[error("field({field}) with expr($or) must be a collection of the declaring type")]
    OrGroupShape { field: &'static str },
}

/// Instance-level errors raised while compiling one value.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("field({field}) operator({operator}) requires a text value")]
    NotText {
        field: &'static str,
        operator: &'static str,
    },
    #[error("field({field}) operator(null) requires a bool value")]
    NotBool { field: &'static str },
    #[error("field({field}): or clauses must be a collection")]
    OrGroupNotCollection { field: &'static str },
    #[error("field({field}) json encode failed: {source}")]
    JsonEncode {
        field: &'static str,
        source: serde_json::Error,
    },
    #[error("field({field}) expr(json_set) requires a struct or map value")]
    JsonSetNotObject { field: &'static str },
    #[error("field({field}) produced {found}, which {token} can not consume")]
    Shape {
        field: &'static str,
        token: &'static str,
        found: &'static str,
    },
    /// The accessor could not produce the requested field; an invalid value.
    #[error("invalid value: field index {index} is not accessible")]
    FieldIndex { index: usize },
}

/// Top-level error returned by every public entry point.
#[derive(Debug, Error)]
pub enum Error {
    #[error("[tagdal] schema error in `{type_name}`: {source}")]
    Schema {
        type_name: &'static str,
        source: SchemaError,
    },
    #[error("[tagdal] value error in `{type_name}`: {source}")]
    Value {
        type_name: &'static str,
        source: ValueError,
    },
    /// A type without mapped columns was used where a record was expected.
    #[error("[tagdal] non-record type (`{0}`) is not supported")]
    NotARecord(&'static str),
    /// Update or delete with an empty predicate.
    #[error("[tagdal] can not {0} without conditions")]
    UnconditionalWrite(&'static str),
    #[error("[tagdal] statement error: {0}")]
    Statement(String),
    #[error("[tagdal] execution error: {0}")]
    Executor(String),
    #[error("[tagdal] decode error: column({column}): {message}")]
    Decode { column: String, message: String },
    #[error("[tagdal] config error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
