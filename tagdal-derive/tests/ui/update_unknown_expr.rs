#![allow(dead_code)]

use tagdal::Update;

#[derive(Update)]
struct ScaleUpdate {
    #[sql(field = "balance", expr = "*")]
    balance: Option<i64>,
}

fn main() {}
