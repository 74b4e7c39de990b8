//! # tagdal
//!
//! Declarative data access: where, update and record structs describe their
//! SQL mapping with `#[sql(...)]` attributes, and `tagdal` compiles instances
//! of them into predicates, update assignments and column lists.
//!
//! ```
//! use std::sync::Arc;
//! use tagdal::{Registry, Where};
//!
//! #[derive(Where, Default)]
//! struct UserWhere {
//!     #[sql(field = "name", operator = "full like")]
//!     name_like: Option<String>,
//!     #[sql(field = "id", operator = "in")]
//!     id_in: Option<Vec<i64>>,
//!     #[sql(expr = "$or")]
//!     or: Vec<UserWhere>,
//! }
//!
//! let registry = Arc::new(Registry::new());
//! let predicate = registry
//!     .compile_where(&UserWhere {
//!         name_like: Some("dirac".into()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//! assert_eq!(predicate.to_string(), "`name` LIKE ?");
//! ```
//!
//! Type declarations are validated once per type and cached in the
//! [`Registry`]; [`Dal`] forwards compiled artifacts to an [`Executor`].

extern crate self as tagdal;

pub mod config;
pub mod dal;
pub mod error;
pub mod executor;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod query;
pub mod record;
pub mod reflect;
pub mod registry;
pub mod schema;
pub mod value;

pub use config::DalConfig;
pub use dal::{Dal, Page, QueryOptions};
pub use error::{Error, Result, SchemaError, ValueError};
pub use executor::{Executor, Row};
pub use query::{Assignment, CompareOp, Fragment, Operand, Param, Predicate, SqlExpr, UpdateMap};
pub use record::{ColumnDecl, Record, Selectable};
pub use reflect::{Embedded, FieldDecl, FieldKind, FieldValue, Reflect, UpdateModel, WhereModel};
pub use registry::Registry;
pub use schema::{ColumnDescriptor, OrGroupDescriptor, TypeDescriptor};
pub use value::{Arg, FieldExpr, SqlArg, SqlValue};

pub use tagdal_derive::{Record, Update, Where};

pub use sea_query;
