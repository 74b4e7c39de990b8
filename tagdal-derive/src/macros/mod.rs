//! Macro implementations

mod record;
mod reflect;
mod update_model;
mod where_model;

pub use record::derive_record;
pub use update_model::derive_update;
pub use where_model::derive_where;
