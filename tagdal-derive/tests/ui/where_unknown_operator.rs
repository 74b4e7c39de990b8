#![allow(dead_code)]

use tagdal::Where;

#[derive(Where)]
struct RangeWhere {
    #[sql(field = "name", operator = "between")]
    name: Option<String>,
}

fn main() {}
