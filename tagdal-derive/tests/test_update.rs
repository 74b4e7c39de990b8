//! Tests for #[derive(Update)]

use tagdal::sea_query::Value;
use serde::Serialize;
use tagdal::{Assignment, FieldExpr, Registry, SqlExpr, Update};

#[derive(Serialize, Default)]
struct Settings {
    theme: Option<String>,
    langs: Option<Vec<String>>,
}

#[derive(Update, Default)]
struct AccountUpdate {
    #[sql(field = "name")]
    name: Option<String>,
    #[sql(field = "balance", expr = "+")]
    deposit: Option<i64>,
    #[sql(field = "points", expr = "-")]
    spend: Option<i32>,
    #[sql(field = "settings", expr = "json_set")]
    settings: Option<Settings>,
    #[sql(field = "extra", expr = "merge_json")]
    extra: Option<serde_json::Value>,
    #[sql(field = "updated_at")]
    touched_from: Option<FieldExpr>,
}

#[test]
fn test_nothing_set() {
    let registry = Registry::new();
    let map = registry.compile_update(&AccountUpdate::default()).unwrap();
    assert!(map.is_empty());
}

#[test]
fn test_assignments_in_declaration_order() {
    let registry = Registry::new();
    let map = registry
        .compile_update(&AccountUpdate {
            touched_from: Some(FieldExpr::new("created_at")),
            deposit: Some(100),
            name: Some("dirac".into()),
            spend: Some(3),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(
        map.columns().collect::<Vec<_>>(),
        vec!["name", "balance", "points", "updated_at"]
    );
    assert_eq!(
        map.get("name"),
        Some(&Assignment::Value(Value::from("dirac".to_string())))
    );
    assert_eq!(
        map.get("balance"),
        Some(&Assignment::Expr(SqlExpr::new("`balance` + ?", vec![Value::from(100i64)])))
    );
    assert_eq!(
        map.get("points"),
        Some(&Assignment::Expr(SqlExpr::new("`points` - ?", vec![Value::from(3i32)])))
    );
    assert_eq!(
        map.get("updated_at"),
        Some(&Assignment::Expr(SqlExpr::new("`created_at`", Vec::new())))
    );
}

#[test]
fn test_json_set() {
    let registry = Registry::new();
    let map = registry
        .compile_update(&AccountUpdate {
            settings: Some(Settings {
                theme: Some("dark".into()),
                langs: None,
            }),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        map.get("settings"),
        Some(&Assignment::Expr(SqlExpr::new(
            "JSON_SET(`settings`, '$.theme', ?)",
            vec![Value::from("dark".to_string())]
        )))
    );
}

#[test]
fn test_merge_json_binds_blob_twice() {
    let registry = Registry::new();
    let map = registry
        .compile_update(&AccountUpdate {
            extra: Some(serde_json::json!({"vip": true})),
            ..Default::default()
        })
        .unwrap();
    match map.get("extra") {
        Some(Assignment::Expr(expr)) => {
            assert!(expr.sql.starts_with("CASE WHEN (`extra` IS NULL OR `extra` = '')"));
            assert_eq!(
                expr.params,
                vec![
                    Value::from("{\"vip\":true}".to_string()),
                    Value::from("{\"vip\":true}".to_string())
                ]
            );
        }
        other => panic!("unexpected assignment: {:?}", other),
    }
}

#[derive(Update, Default)]
struct SettingsUpdate {
    #[sql(field = "settings", expr = "merge_json")]
    settings: Option<Settings>,
}

#[test]
fn test_merge_json_nulls() {
    let registry = Registry::new();

    // unset struct fields are left out of the patch
    let map = registry
        .compile_update(&SettingsUpdate {
            settings: Some(Settings {
                theme: Some("dark".into()),
                langs: None,
            }),
        })
        .unwrap();
    match map.get("settings") {
        Some(Assignment::Expr(expr)) => {
            assert_eq!(expr.params[0], Value::from("{\"theme\":\"dark\"}".to_string()))
        }
        other => panic!("unexpected assignment: {:?}", other),
    }
    let map = registry
        .compile_update(&SettingsUpdate {
            settings: Some(Settings::default()),
        })
        .unwrap();
    assert!(map.is_empty());

    // a null in a JSON value removes the key
    let map = registry
        .compile_update(&AccountUpdate {
            extra: Some(serde_json::json!({"vip": null})),
            ..Default::default()
        })
        .unwrap();
    match map.get("extra") {
        Some(Assignment::Expr(expr)) => {
            assert_eq!(expr.params[0], Value::from("{\"vip\":null}".to_string()))
        }
        other => panic!("unexpected assignment: {:?}", other),
    }
}

#[derive(Update, Default)]
struct AuditUpdate {
    #[sql(field = "updated_by")]
    updated_by: Option<String>,
}

#[derive(Update, Default)]
struct ProfileUpdate {
    #[sql(flatten)]
    audit: AuditUpdate,
    #[sql(field = "bio")]
    bio: Option<String>,
    #[sql(skip)]
    #[allow(dead_code)]
    scratch: Option<String>,
}

#[test]
fn test_flattened_update() {
    let registry = Registry::new();
    let map = registry
        .compile_update(&ProfileUpdate {
            audit: AuditUpdate {
                updated_by: Some("ops".into()),
            },
            bio: Some("hi".into()),
            scratch: Some("ignored".into()),
        })
        .unwrap();
    assert_eq!(map.columns().collect::<Vec<_>>(), vec!["updated_by", "bio"]);
}
