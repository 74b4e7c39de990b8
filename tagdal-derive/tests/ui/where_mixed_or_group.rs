#![allow(dead_code)]

use tagdal::Where;

#[derive(Where)]
struct MixedWhere {
    #[sql(field = "some_field", expr = "$or")]
    or_clauses: Vec<MixedWhere>,
}

fn main() {}
