//! End-to-end compilation through the derives and the shared registry.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use tagdal::sea_query::Value;
use tagdal::{
    Assignment, Error, FieldDecl, FieldExpr, FieldKind, FieldValue, Param, Reflect, Registry,
    SchemaError, SqlExpr, Update, ValueError, Where, WhereModel,
};

#[derive(Where, Default, Clone)]
struct UserWhere {
    #[sql(field = "id")]
    id: Option<i64>,
    #[sql(field = "name", operator = "full like")]
    name_like: Option<String>,
    #[sql(field = "age", operator = ">=")]
    age_gte: Option<i32>,
    #[sql(field = "id", operator = "in")]
    id_in: Option<Vec<i64>>,
    #[sql(field = "id", operator = "not in")]
    id_not_in: Vec<i64>,
    #[sql(field = "deleted_at", operator = "null")]
    deleted: Option<bool>,
    #[sql(field = "tags", operator = "json_contains all")]
    tags: Vec<String>,
    #[sql(expr = "$or")]
    or: Vec<UserWhere>,
}

#[derive(Update, Default)]
struct UserUpdate {
    #[sql(field = "name")]
    name: Option<String>,
    #[sql(field = "balance", expr = "+")]
    balance: Option<i64>,
    #[sql(field = "profile", expr = "json_set")]
    profile: Option<serde_json::Value>,
    #[sql(field = "extra", expr = "merge_json")]
    extra: Option<serde_json::Value>,
}

#[test]
fn test_empty_where_matches_everything() {
    let registry = Registry::new();
    let predicate = registry.compile_where(&UserWhere::default()).unwrap();
    assert!(predicate.is_empty());
    assert_eq!(predicate.to_bound_sql(), (String::new(), Vec::new()));
}

#[test]
fn test_like_wraps_pattern() {
    let registry = Registry::new();
    let predicate = registry
        .compile_where(&UserWhere {
            name_like: Some("dirac".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(predicate.to_string(), "`name` LIKE ?");
    assert_eq!(
        predicate.params(),
        vec![Param::Value(Value::from("%dirac%".to_string()))]
    );
}

#[test]
fn test_id_in_expands_for_binding() {
    let registry = Registry::new();
    let predicate = registry
        .compile_where(&UserWhere {
            id_in: Some(vec![110, 120]),
            id_not_in: vec![5],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(predicate.to_string(), "`id` IN (?) AND `id` NOT IN (?)");

    let (sql, values) = predicate.to_bound_sql();
    assert_eq!(sql, "`id` IN (?, ?) AND `id` NOT IN (?)");
    assert_eq!(
        values,
        vec![Value::from(110i64), Value::from(120i64), Value::from(5i64)]
    );
}

#[test]
fn test_nil_and_empty_collections_differ() {
    let registry = Registry::new();

    let unset = registry.compile_where(&UserWhere::default()).unwrap();
    assert!(unset.is_empty());

    let empty = registry
        .compile_where(&UserWhere {
            id_in: Some(Vec::new()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(empty.to_bound_sql().0, "`id` IN (NULL)");

    let bare_empty = registry
        .compile_where(&UserWhere {
            id_not_in: Vec::new(),
            ..Default::default()
        })
        .unwrap();
    assert!(bare_empty.is_empty());
}

#[test]
fn test_json_contains_all_collapses() {
    let registry = Registry::new();
    let single = registry
        .compile_where(&UserWhere {
            tags: vec!["a".into()],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(single.to_string(), "JSON_CONTAINS(`tags`, ?)");

    let many = registry
        .compile_where(&UserWhere {
            tags: vec!["a".into(), "b".into()],
            age_gte: Some(18),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        many.to_string(),
        "`age` >= ? AND JSON_CONTAINS(`tags`, ?) AND JSON_CONTAINS(`tags`, ?)"
    );
}

#[test]
fn test_or_group_inside_conjunction() {
    let registry = Registry::new();
    let predicate = registry
        .compile_where(&UserWhere {
            deleted: Some(true),
            or: vec![
                UserWhere {
                    id: Some(1),
                    age_gte: Some(30),
                    ..Default::default()
                },
                UserWhere {
                    name_like: Some("x".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(predicate.depth(), 1);
    assert_eq!(
        predicate.to_string(),
        "`deleted_at` IS NULL AND ((`id` = ? AND `age` >= ?) OR `name` LIKE ?)"
    );
}

#[test]
fn test_update_compiles_in_declaration_order() {
    let registry = Registry::new();
    let map = registry
        .compile_update(&UserUpdate {
            balance: Some(100),
            name: Some("dirac".into()),
            profile: Some(serde_json::json!({"city": "x", "zip": null, "tags": ["a"]})),
            extra: None,
        })
        .unwrap();

    assert_eq!(
        map.columns().collect::<Vec<_>>(),
        vec!["name", "balance", "profile"]
    );
    assert_eq!(
        map.get("balance"),
        Some(&Assignment::Expr(SqlExpr::new("`balance` + ?", vec![Value::from(100i64)])))
    );
    assert_eq!(
        map.get("profile"),
        Some(&Assignment::Expr(SqlExpr::new(
            "JSON_SET(`profile`, '$.city', ?, '$.tags', CAST(? AS JSON))",
            vec![
                Value::from("x".to_string()),
                Value::from("[\"a\"]".to_string())
            ]
        )))
    );
}

#[test]
fn test_json_set_rejects_non_object() {
    let registry = Registry::new();
    let err = registry
        .compile_update(&UserUpdate {
            profile: Some(serde_json::json!([1, 2])),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Value {
            source: ValueError::JsonSetNotObject { field: "profile" },
            ..
        }
    ));
}

#[test]
fn test_field_expr_compares_columns() {
    #[derive(Where, Default)]
    struct WindowWhere {
        #[sql(field = "starts_at", operator = "<=")]
        starts_before: Option<FieldExpr>,
    }

    let registry = Registry::new();
    let predicate = registry
        .compile_where(&WindowWhere {
            starts_before: Some(FieldExpr::new("ends_at")),
        })
        .unwrap();
    assert_eq!(predicate.to_string(), "`starts_at` <= `ends_at`");
    assert!(predicate.params().is_empty());
}

#[derive(Where, Default)]
struct LooseWhere {
    #[sql(field = "age", operator = "like")]
    age_like: Option<i64>,
    #[sql(field = "deleted_at", operator = "null")]
    deleted: Option<String>,
    #[sql(field = "name", operator = "left like")]
    name_suffix: Option<FieldExpr>,
}

#[test]
fn test_like_requires_text() {
    let registry = Registry::new();
    let err = registry
        .compile_where(&LooseWhere {
            age_like: Some(3),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Value {
            source: ValueError::NotText {
                field: "age_like",
                operator: "like"
            },
            ..
        }
    ));
    assert!(err
        .to_string()
        .contains("field(age_like) operator(like) requires a text value"));

    let err = registry
        .compile_where(&LooseWhere {
            name_suffix: Some(FieldExpr::new("nickname")),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Value {
            source: ValueError::NotText {
                field: "name_suffix",
                operator: "left like"
            },
            ..
        }
    ));
}

#[test]
fn test_null_requires_bool() {
    let registry = Registry::new();
    let err = registry
        .compile_where(&LooseWhere {
            deleted: Some("yes".into()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Value {
            source: ValueError::NotBool { field: "deleted" },
            ..
        }
    ));
    assert!(err
        .to_string()
        .contains("field(deleted) operator(null) requires a bool value"));
}

/// Declarations a derive would reject, written by hand.
struct MixedWhere {
    or_clauses: Vec<MixedWhere>,
}

impl Reflect for MixedWhere {
    fn fields() -> &'static [FieldDecl] {
        const FIELDS: &[FieldDecl] = &[FieldDecl::new("or_clauses", FieldKind::Collection)
            .column("some_field")
            .expr("$or")];
        FIELDS
    }

    fn field(&self, index: usize) -> Result<FieldValue<'_>, ValueError> {
        match index {
            0 => Ok(FieldValue::group(&self.or_clauses)),
            _ => Err(ValueError::FieldIndex { index }),
        }
    }
}

impl WhereModel for MixedWhere {}

#[test]
fn test_schema_error_is_cached() {
    let registry = Registry::new();
    for _ in 0..2 {
        let err = registry
            .compile_where(&MixedWhere {
                or_clauses: Vec::new(),
            })
            .unwrap_err();
        match err {
            Error::Schema { source, .. } => {
                assert_eq!(
                    source,
                    SchemaError::MixedTag {
                        field: "or_clauses",
                        mapping: "some_field"
                    }
                );
                assert_eq!(
                    source.to_string(),
                    "struct field(or_clauses) with mix of field(some_field) and expr($or) invalid"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

struct RequiredWhere {
    age: i64,
}

impl Reflect for RequiredWhere {
    fn fields() -> &'static [FieldDecl] {
        const FIELDS: &[FieldDecl] = &[FieldDecl::new("age", FieldKind::Required).column("age")];
        FIELDS
    }

    fn field(&self, index: usize) -> Result<FieldValue<'_>, ValueError> {
        match index {
            0 => Ok(FieldValue::scalar(&Some(self.age))),
            _ => Err(ValueError::FieldIndex { index }),
        }
    }
}

impl WhereModel for RequiredWhere {}

#[test]
fn test_required_field_is_rejected() {
    let registry = Registry::new();
    let err = registry.compile_where(&RequiredWhere { age: 1 }).unwrap_err();
    assert!(matches!(
        err,
        Error::Schema {
            source: SchemaError::MustBeOptional { field: "age", .. },
            ..
        }
    ));
}

#[test]
fn test_shared_registry_across_threads() {
    let registry = Arc::new(Registry::new());
    let handles: Vec<_> = (0..8i64)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let predicate = registry
                    .compile_where(&UserWhere {
                        id: Some(i),
                        ..Default::default()
                    })
                    .unwrap();
                (registry.register::<UserWhere>().unwrap(), predicate)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = &results[0].0;
    for (descriptor, predicate) in &results {
        assert!(Arc::ptr_eq(first, descriptor));
        assert_eq!(predicate.to_string(), "`id` = ?");
    }
}
