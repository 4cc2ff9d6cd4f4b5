//! Compile-time tests for the `Populate` derive macro.
//!
//! Run with: cargo nextest run --package confkit trybuild

#![cfg(feature = "derive")]

#[test]
fn compile_pass() {
    let t = trybuild::TestCases::new();
    t.pass("tests/compile_pass/basic.rs");
    t.pass("tests/compile_pass/attributes.rs");
    t.pass("tests/compile_pass/generics.rs");
}
