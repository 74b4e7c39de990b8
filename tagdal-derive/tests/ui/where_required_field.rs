#![allow(dead_code)]

use tagdal::Where;

#[derive(Where)]
struct RequiredWhere {
    #[sql(field = "age")]
    age: i64,
}

fn main() {}
