#![allow(dead_code)]

use tagdal::Where;

#[derive(Where)]
struct UntaggedWhere {
    age: Option<i64>,
}

fn main() {}
