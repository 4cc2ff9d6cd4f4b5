//! Integration tests for the built-in decoders.
//!
//! The same document is expressed in every format and must decode to the
//! same normalised tree.

#![allow(clippy::pedantic)]

use std::io::Cursor;

use confkit::{DecoderFactory, Error, Partial, Value};
use miette::Diagnostic;

fn decode(format: &str, content: &str) -> confkit::Result<Partial> {
    DecoderFactory::default().decode(format, Cursor::new(content.to_string().into_bytes()))
}

const JSON: &str = r#"{
    "Service": {
        "Name": "api",
        "Port": 8080,
        "Ratio": 0.5,
        "Debug": false,
        "Hosts": ["a", "b"]
    }
}"#;

fn expected() -> Partial {
    let mut p = Partial::new();
    p.set("service.name", "api").unwrap();
    p.set("service.port", 8080).unwrap();
    p.set("service.ratio", 0.5).unwrap();
    p.set("service.debug", false).unwrap();
    p.set("service.hosts", vec!["a", "b"]).unwrap();
    p
}

// ============================================================================
// Cross-format equivalence
// ============================================================================

#[test]
fn test_json_document() {
    assert_eq!(decode("json", JSON).unwrap(), expected());
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_document_matches_json() {
    let yaml = "Service:\n  Name: api\n  Port: 8080\n  Ratio: 0.5\n  Debug: false\n  Hosts:\n    - a\n    - b\n";
    assert_eq!(decode("yaml", yaml).unwrap(), expected());
    assert_eq!(decode("YML", yaml).unwrap(), expected());
}

#[cfg(feature = "toml")]
#[test]
fn test_toml_document_matches_json() {
    let toml = "[Service]\nName = \"api\"\nPort = 8080\nRatio = 0.5\nDebug = false\nHosts = [\"a\", \"b\"]\n";
    assert_eq!(decode("toml", toml).unwrap(), expected());
}

#[test]
fn test_integral_floats_become_ints() {
    let tree = decode("json", r#"{"a": 3.0, "b": [1.0, 1.5], "c": {"D": 2.0}}"#).unwrap();
    assert_eq!(tree.get("a").unwrap(), &Value::Int(3));
    assert_eq!(
        tree.get("b").unwrap(),
        &Value::List(vec![Value::Int(1), Value::Float(1.5)])
    );
    assert_eq!(tree.get("c.d").unwrap(), &Value::Int(2));
}

#[test]
fn test_nulls_are_dropped() {
    let tree = decode("json", r#"{"a": null, "b": [null, 1], "c": 2}"#).unwrap();
    assert!(!tree.has("a"));
    assert_eq!(tree.list("b").unwrap(), &[Value::Int(1)]);
    assert_eq!(tree.int("c").unwrap(), 2);
}

#[cfg(feature = "yaml")]
#[test]
fn test_list_nulls_shift_indices() {
    let tree = decode("yaml", "ports: [1, ~, 2]\n").unwrap();
    assert_eq!(tree.list("ports").unwrap(), &[Value::Int(1), Value::Int(2)]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_format() {
    let err = decode("ini", "a = 1").unwrap_err();
    assert!(matches!(err, Error::InvalidFormat { format } if format == "ini"));
}

#[test]
fn test_json_error_is_diagnostic() {
    let err = decode("json", "{\n  \"a\": 1,\n  \"b\": oops\n}").unwrap_err();

    assert!(matches!(err, Error::Decode { format: "JSON", .. }));
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("confkit::decode".to_string())
    );
    assert!(err.help().is_some());
    assert!(err.source_code().is_some());
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_scalar_root_rejected() {
    let err = decode("yaml", "just a string\n").unwrap_err();
    assert!(matches!(err, Error::NotATree { format: "YAML", found: "string" }));
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_syntax_error() {
    let err = decode("yaml", "a: [1, 2\nb: 3\n").unwrap_err();
    assert!(matches!(
        err,
        Error::Decode { format: "YAML", .. } | Error::DecodeNoSpan { format: "YAML", .. }
    ));
}

#[cfg(feature = "toml")]
#[test]
fn test_toml_duplicate_key() {
    let err = decode("toml", "a = 1\na = 2\n").unwrap_err();
    assert!(matches!(
        err,
        Error::Decode { format: "TOML", .. } | Error::DecodeNoSpan { format: "TOML", .. }
    ));
}
