use tagdal::{FieldExpr, Registry, Where};

#[derive(Where, Default)]
#[sql(force_index = "idx_status")]
pub struct ShapeWhere {
    #[sql(field = "a")]
    pub eq: Option<i64>,
    #[sql(field = "b", operator = "<=")]
    pub column: Option<FieldExpr>,
    #[sql(field = "c", operator = "in")]
    pub bare_in: Vec<u32>,
    #[sql(field = "d", operator = "not in")]
    pub optional_in: Option<Vec<String>>,
    #[sql(field = "e", operator = "json_contains")]
    pub doc: Option<serde_json::Value>,
    #[sql(field = "f", operator = "json_contains all")]
    pub all: Option<Vec<i32>>,
    #[sql(field = "g", operator = "right like")]
    pub prefix: Option<String>,
    #[sql(field = "h", operator = "null")]
    pub missing: Option<bool>,
    #[sql(skip)]
    pub ignored: u8,
    #[sql(expr = "$or")]
    pub any: Option<Vec<ShapeWhere>>,
}

fn main() {
    let registry = Registry::new();
    let predicate = registry.compile_where(&ShapeWhere::default()).unwrap();
    assert!(predicate.is_empty());
}
