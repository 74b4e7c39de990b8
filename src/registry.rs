//! Per-type descriptor cache.
//!
//! The first use of a type parses and validates its declarations; every later
//! use reads the cached result. Failures are cached too, so a bad declaration
//! reports the same [`SchemaError`] on every call.
//!
//! `Registry` is `Send + Sync`; share it behind an `Arc` between threads.

use crate::error::{Error, Result, SchemaError};
use crate::query::{filter, update, Predicate, UpdateMap};
use crate::record::{Record, Selectable};
use crate::reflect::{Reflect, UpdateModel, WhereModel};
use crate::schema::{self, OrGroupDescriptor, TypeDescriptor};
use dashmap::DashMap;
use std::any::{type_name, TypeId};
use std::sync::Arc;

type Cached<T> = std::result::Result<Arc<T>, SchemaError>;

#[derive(Default)]
pub struct Registry {
    types: DashMap<TypeId, Cached<TypeDescriptor>>,
    or_groups: DashMap<TypeId, Cached<OrGroupDescriptor>>,
    selectors: DashMap<TypeId, Arc<[&'static str]>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the descriptor for `T`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the declarations of `T` are invalid.
    pub fn register<T: Reflect>(&self) -> Result<Arc<TypeDescriptor>> {
        let type_name = type_name::<T>();
        let built = lookup(&self.types, TypeId::of::<T>(), type_name, || {
            schema::parse_type(type_name, T::fields())
        });
        built.map_err(|source| Error::Schema { type_name, source })
    }

    /// Returns the top-level OR-group fields of `T`.
    pub fn or_groups<T: Reflect>(&self) -> Result<Arc<OrGroupDescriptor>> {
        let type_name = type_name::<T>();
        let built = lookup(&self.or_groups, TypeId::of::<T>(), type_name, || {
            schema::parse_or_groups(T::fields())
        });
        built.map_err(|source| Error::Schema { type_name, source })
    }

    /// Compiles the set fields of `value` into a predicate.
    ///
    /// An all-unset value yields an empty predicate (match all).
    pub fn compile_where<W: WhereModel>(&self, value: &W) -> Result<Predicate> {
        let descriptor = self.register::<W>()?;
        let groups = self.or_groups::<W>()?;
        log::trace!("compiling where for {}", descriptor.type_name());

        filter::compile(&descriptor, &groups, value).map_err(|source| {
            #[cfg(feature = "metrics")]
            crate::metrics::METRICS.record_compile_failure();
            Error::Value {
                type_name: descriptor.type_name(),
                source,
            }
        })
    }

    /// Compiles the set fields of `value` into an ordered update map.
    pub fn compile_update<U: UpdateModel>(&self, value: &U) -> Result<UpdateMap> {
        let descriptor = self.register::<U>()?;
        log::trace!("compiling update for {}", descriptor.type_name());

        update::compile(&descriptor, value).map_err(|source| {
            #[cfg(feature = "metrics")]
            crate::metrics::METRICS.record_compile_failure();
            Error::Value {
                type_name: descriptor.type_name(),
                source,
            }
        })
    }

    /// Column names of the record behind `T`, in declaration order.
    ///
    /// `T` may be the record itself or a reference, box, slice, `Vec`,
    /// `Option` or `Arc` of it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARecord`] when the record declares no columns.
    pub fn columns_of<T: Selectable + ?Sized>(&self) -> Result<Arc<[&'static str]>> {
        self.record_columns::<T::Record>()
    }

    /// Column names of a record type, cached by type.
    pub fn record_columns<R: Record>(&self) -> Result<Arc<[&'static str]>> {
        let key = TypeId::of::<R>();
        if let Some(columns) = self.selectors.get(&key) {
            return Ok(Arc::clone(columns.value()));
        }

        let decls = R::columns();
        if decls.is_empty() {
            return Err(Error::NotARecord(type_name::<R>()));
        }
        let columns: Arc<[&'static str]> = decls.iter().map(|c| c.column).collect();
        log::debug!("selector for {}: {} columns", type_name::<R>(), columns.len());

        let stored = self.selectors.entry(key).or_insert(columns);
        Ok(Arc::clone(stored.value()))
    }

    /// Same as [`Registry::columns_of`], taking a value to infer the type.
    pub fn columns_of_val<T: Selectable + ?Sized>(&self, _value: &T) -> Result<Arc<[&'static str]>> {
        self.columns_of::<T>()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types.len())
            .field("or_groups", &self.or_groups.len())
            .field("selectors", &self.selectors.len())
            .finish()
    }
}

/// Reads a cached entry or builds and stores it. Concurrent first uses may
/// both build; the first stored result wins.
fn lookup<T>(
    cache: &DashMap<TypeId, Cached<T>>,
    key: TypeId,
    type_name: &'static str,
    build: impl FnOnce() -> std::result::Result<T, SchemaError>,
) -> Cached<T> {
    if let Some(entry) = cache.get(&key) {
        #[cfg(feature = "metrics")]
        crate::metrics::METRICS.record_lookup(true);
        let cached = entry.value().clone();
        if let Err(err) = &cached {
            log::debug!("cached schema error for {}: {}", type_name, err);
        }
        return cached;
    }

    #[cfg(feature = "metrics")]
    crate::metrics::METRICS.record_lookup(false);
    let built = build().map(Arc::new);
    match &built {
        Ok(_) => log::debug!("built descriptor for {}", type_name),
        Err(err) => {
            #[cfg(feature = "metrics")]
            crate::metrics::METRICS.record_schema_failure();
            log::warn!("schema error for {}: {}", type_name, err);
        }
    }

    cache.entry(key).or_insert(built).value().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use crate::reflect::{FieldDecl, FieldKind, FieldValue};
    use std::thread;

    struct Broken;

    impl Reflect for Broken {
        fn fields() -> &'static [FieldDecl] {
            const FIELDS: &[FieldDecl] = &[FieldDecl::new("name", FieldKind::Optional)
                .column("name")
                .operator("invalid")];
            FIELDS
        }

        fn field(&self, index: usize) -> std::result::Result<FieldValue<'_>, ValueError> {
            Err(ValueError::FieldIndex { index })
        }
    }

    struct ById {
        id: Option<i64>,
    }

    impl Reflect for ById {
        fn fields() -> &'static [FieldDecl] {
            const FIELDS: &[FieldDecl] = &[FieldDecl::new("id", FieldKind::Optional).column("id")];
            FIELDS
        }

        fn field(&self, index: usize) -> std::result::Result<FieldValue<'_>, ValueError> {
            match index {
                0 => Ok(FieldValue::scalar(&self.id)),
                _ => Err(ValueError::FieldIndex { index }),
            }
        }
    }

    impl WhereModel for ById {}

    #[test]
    fn test_register_returns_same_descriptor() {
        let registry = Registry::new();
        let first = registry.register::<ById>().unwrap();
        let second = registry.register::<ById>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_schema_error_is_cached() {
        let registry = Registry::new();
        for _ in 0..2 {
            match registry.register::<Broken>() {
                Err(Error::Schema { source, .. }) => assert_eq!(
                    source,
                    SchemaError::InvalidOperator {
                        field: "name",
                        token: "invalid"
                    }
                ),
                other => panic!("unexpected {:?}", other.map(|_| ())),
            }
        }
        assert_eq!(registry.types.len(), 1);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.register::<ById>().unwrap())
            })
            .collect();
        let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for d in &descriptors[1..] {
            assert!(Arc::ptr_eq(&descriptors[0], d));
        }
    }

    #[test]
    fn test_compile_where_uses_cached_descriptor() {
        let registry = Registry::new();
        let predicate = registry.compile_where(&ById { id: Some(1) }).unwrap();
        assert_eq!(predicate.to_string(), "`id` = ?");
        let predicate = registry.compile_where(&ById { id: None }).unwrap();
        assert!(predicate.is_empty());
        assert_eq!(registry.types.len(), 1);
    }

    #[test]
    fn test_compile_where_rejects_broken_type() {
        impl WhereModel for Broken {}
        let registry = Registry::new();
        assert!(matches!(
            registry.compile_where(&Broken),
            Err(Error::Schema { .. })
        ));
    }
}
