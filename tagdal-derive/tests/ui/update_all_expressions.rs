use tagdal::{FieldExpr, Registry, Update};

#[derive(Update, Default)]
pub struct CounterUpdate {
    #[sql(field = "label")]
    pub label: Option<String>,
    #[sql(field = "hits", expr = "+")]
    pub hits: Option<u64>,
    #[sql(field = "stock", expr = "-")]
    pub stock: Option<FieldExpr>,
    #[sql(field = "meta", expr = "json_set")]
    pub meta: Option<serde_json::Value>,
    #[sql(field = "extra", expr = "merge_json")]
    pub extra: Option<std::collections::BTreeMap<String, i32>>,
}

fn main() {
    let registry = Registry::new();
    let map = registry.compile_update(&CounterUpdate::default()).unwrap();
    assert!(map.is_empty());
}
