//! UI tests for the derive macros: accepted shapes and rejected tags
//!
//! Note: We use a single shared TestCases instance to avoid race conditions
//! when tests run in parallel.

#[macro_use]
extern crate lazy_static;

use std::sync::Mutex;

lazy_static! {
    static ref TEST_CASES: Mutex<trybuild::TestCases> = Mutex::new(trybuild::TestCases::new());
}

#[test]
fn where_with_all_shapes() {
    let t = TEST_CASES.lock().unwrap();
    t.pass("tests/ui/where_all_shapes.rs");
}

#[test]
fn update_with_all_expressions() {
    let t = TEST_CASES.lock().unwrap();
    t.pass("tests/ui/update_all_expressions.rs");
}

#[test]
fn record_with_raw_identifiers() {
    let t = TEST_CASES.lock().unwrap();
    t.pass("tests/ui/record_raw_identifiers.rs");
}

#[test]
fn compile_error_mixed_or_group() {
    let t = TEST_CASES.lock().unwrap();
    t.compile_fail("tests/ui/where_mixed_or_group.rs");
}

#[test]
fn compile_error_missing_field_tag() {
    let t = TEST_CASES.lock().unwrap();
    t.compile_fail("tests/ui/where_missing_field_tag.rs");
}

#[test]
fn compile_error_unknown_operator() {
    let t = TEST_CASES.lock().unwrap();
    t.compile_fail("tests/ui/where_unknown_operator.rs");
}

#[test]
fn compile_error_unknown_update_expr() {
    let t = TEST_CASES.lock().unwrap();
    t.compile_fail("tests/ui/update_unknown_expr.rs");
}

#[test]
fn compile_error_required_field() {
    let t = TEST_CASES.lock().unwrap();
    t.compile_fail("tests/ui/where_required_field.rs");
}
