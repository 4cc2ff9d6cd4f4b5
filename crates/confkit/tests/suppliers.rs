//! Integration tests for the built-in suppliers and the supplier factory.
//!
//! Filesystem fixtures live in per-test temporary directories; tests that
//! touch the process environment run serially.

#![allow(clippy::pedantic)]

use std::fs::{self, OpenOptions};
use std::path::Path as FsPath;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use confkit::supplier::{
    AggregateCreator, DirSupplier, Endpoint, FileSupplier, HttpClient, ObservableFileSupplier,
    ObservableRestSupplier, PartialSupplier, RestSupplier,
};
use confkit::{
    DecoderFactory, Error, ObservableSupplier, Options, Partial, Path, Result, Supplier,
    SupplierFactory, Value,
};
use parking_lot::Mutex;
use serial_test::serial;
use tempfile::tempdir;

fn decoders() -> Arc<DecoderFactory> {
    Arc::new(DecoderFactory::default())
}

fn description(pairs: &[(&str, Value)]) -> Partial {
    let mut d = Partial::new();
    for (path, value) in pairs {
        d.set(*path, value.clone()).unwrap();
    }
    d
}

/// Pushes the file's modification time `secs` into the future.
fn touch_ahead(path: &FsPath, secs: u64) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(secs))
        .unwrap();
}

// ============================================================================
// File
// ============================================================================

#[test]
fn test_file_supplier_reads_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, r#"{"Server": {"Port": 8080, "Host": "localhost"}}"#).unwrap();

    let supplier = FileSupplier::new(&path, "json", &decoders()).unwrap();
    assert!(supplier.has(Path::new("server.port")));
    assert_eq!(supplier.get(Path::new("server.port")).unwrap(), Value::Int(8080));
    assert_eq!(supplier.path(), path.as_path());
}

#[test]
fn test_file_supplier_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = FileSupplier::new(dir.path().join("absent.json"), "json", &decoders()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_file_supplier_unknown_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");
    fs::write(&path, "a = 1").unwrap();

    let err = FileSupplier::new(&path, "ini", &decoders()).unwrap_err();
    assert!(matches!(err, Error::InvalidFormat { .. }));
}

#[test]
fn test_file_supplier_decode_error_aborts_construction() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"a": "#).unwrap();

    let err = FileSupplier::new(&path, "json", &decoders()).unwrap_err();
    assert!(matches!(err, Error::Decode { .. } | Error::DecodeNoSpan { .. }));
}

// ============================================================================
// Observable file
// ============================================================================

#[test]
fn test_observable_file_reloads_on_newer_mtime() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("live.json");
    fs::write(&path, r#"{"a": 1}"#).unwrap();

    let mut supplier = ObservableFileSupplier::new(&path, "json", decoders()).unwrap();

    assert!(supplier.reload().unwrap(), "first reload always loads");
    assert!(!supplier.reload().unwrap(), "unchanged mtime");
    assert_eq!(supplier.get(Path::new("a")).unwrap(), Value::Int(1));

    fs::write(&path, r#"{"a": 2}"#).unwrap();
    touch_ahead(&path, 10);

    assert!(supplier.reload().unwrap());
    assert_eq!(supplier.get(Path::new("a")).unwrap(), Value::Int(2));
    assert!(!supplier.reload().unwrap());
}

#[test]
fn test_observable_file_reload_error_keeps_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("live.json");
    fs::write(&path, r#"{"a": 1}"#).unwrap();

    let mut supplier = ObservableFileSupplier::new(&path, "json", decoders()).unwrap();
    supplier.reload().unwrap();

    fs::write(&path, "{ not json").unwrap();
    touch_ahead(&path, 10);

    assert!(supplier.reload().is_err());
    assert_eq!(supplier.get(Path::new("a")).unwrap(), Value::Int(1));
}

#[test]
fn test_observable_file_is_observable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("live.json");
    fs::write(&path, "{}").unwrap();

    let mut boxed: Box<dyn Supplier> =
        Box::new(ObservableFileSupplier::new(&path, "json", decoders()).unwrap());
    assert!(boxed.as_observable().is_some());

    let mut plain: Box<dyn Supplier> =
        Box::new(FileSupplier::new(&path, "json", &decoders()).unwrap());
    assert!(plain.as_observable().is_none());
}

// ============================================================================
// Directory
// ============================================================================

#[test]
fn test_dir_supplier_merges_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("server.json"), r#"{"server": {"port": 80}}"#).unwrap();
    fs::write(dir.path().join("db.json"), r#"{"db": {"url": "postgres://x"}}"#).unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/extra.json"), r#"{"extra": true}"#).unwrap();

    let flat = DirSupplier::new(dir.path(), "json", false, &decoders()).unwrap();
    assert_eq!(flat.get(Path::new("server.port")).unwrap(), Value::Int(80));
    assert!(flat.has(Path::new("db.url")));
    assert!(!flat.has(Path::new("extra")));

    let deep = DirSupplier::new(dir.path(), "json", true, &decoders()).unwrap();
    assert!(deep.has(Path::new("extra")));
}

#[test]
fn test_dir_supplier_missing_dir() {
    let dir = tempdir().unwrap();
    let result = DirSupplier::new(dir.path().join("absent"), "json", false, &decoders());
    assert!(matches!(result, Err(Error::Io(_))));
}

// ============================================================================
// Environment
// ============================================================================

#[test]
#[serial]
fn test_env_supplier_from_description() {
    unsafe {
        std::env::set_var("CONFKIT_TEST_PORT", "8080");
        std::env::set_var("CONFKIT_TEST_HOST", "example.org");
        std::env::set_var("CONFKIT_TEST_EMPTY", "");
        std::env::remove_var("CONFKIT_TEST_MISSING");
    }

    let factory = SupplierFactory::with_defaults(decoders(), &Options::default(), None);
    let d = description(&[
        ("type", "env".into()),
        ("mappings.CONFKIT_TEST_PORT", "server.port".into()),
        ("mappings.confkit_test_host", "server.host".into()),
        ("mappings.CONFKIT_TEST_EMPTY", "server.empty".into()),
        ("mappings.CONFKIT_TEST_MISSING", "server.missing".into()),
    ]);
    let supplier = factory.create(&d).unwrap();

    assert_eq!(supplier.get(Path::new("server.port")).unwrap(), Value::Int(8080));
    assert_eq!(
        supplier.get(Path::new("server.host")).unwrap(),
        Value::from("example.org")
    );
    assert!(!supplier.has(Path::new("server.empty")));
    assert!(!supplier.has(Path::new("server.missing")));

    unsafe {
        std::env::remove_var("CONFKIT_TEST_PORT");
        std::env::remove_var("CONFKIT_TEST_HOST");
        std::env::remove_var("CONFKIT_TEST_EMPTY");
    }
}

#[test]
#[serial]
fn test_env_supplier_custom_separator() {
    unsafe {
        std::env::set_var("CONFKIT_TEST_RATIO", "0.25");
    }

    let supplier = confkit::supplier::EnvSupplier::new([("CONFKIT_TEST_RATIO", "a/b")], '/')
        .unwrap();
    assert_eq!(
        supplier.get(Path::with_separator("a/b", '/')).unwrap(),
        Value::Float(0.25)
    );

    unsafe {
        std::env::remove_var("CONFKIT_TEST_RATIO");
    }
}

#[test]
#[serial]
fn test_env_supplier_target_paths_are_case_folded() {
    unsafe {
        std::env::set_var("CONFKIT_TEST_FOLDED_PORT", "9090");
    }

    let dir = tempdir().unwrap();
    let path = dir.path().join("app.json");
    fs::write(&path, r#"{"server": {"host": "localhost"}}"#).unwrap();

    let env = confkit::supplier::EnvSupplier::new([("CONFKIT_TEST_FOLDED_PORT", "Server.Port")], '.')
        .unwrap();
    assert_eq!(env.get(Path::new("server.port")).unwrap(), Value::Int(9090));
    assert!(!env.has(Path::new("Server.Port")));

    let manager = confkit::ConfigManager::new(Options::default()).unwrap();
    manager
        .add_supplier("file", 0, Box::new(FileSupplier::new(&path, "json", &decoders()).unwrap()))
        .unwrap();
    manager.add_supplier("env", 1, Box::new(env)).unwrap();

    assert_eq!(manager.int("server.port").unwrap(), 9090);
    assert_eq!(manager.string("server.host").unwrap(), "localhost");

    unsafe {
        std::env::remove_var("CONFKIT_TEST_FOLDED_PORT");
    }
}

#[test]
fn test_env_description_requires_mappings() {
    let factory = SupplierFactory::with_defaults(decoders(), &Options::default(), None);
    let err = factory
        .create(&description(&[("type", "env".into())]))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        Error::MissingField {
            kind: "env",
            field: "mappings"
        }
    ));
}

// ============================================================================
// Factory descriptions
// ============================================================================

#[test]
fn test_file_description_requires_path() {
    let factory = SupplierFactory::with_defaults(decoders(), &Options::default(), None);
    let err = factory
        .create(&description(&[("type", "file".into())]))
        .err()
        .unwrap();

    assert!(err.to_string().contains("`path`"));
}

#[test]
fn test_file_description_uses_default_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.conf");
    fs::write(&path, r#"{"a": 1}"#).unwrap();

    let options = Options::default();
    let factory = SupplierFactory::with_defaults(decoders(), &options, None);
    let d = description(&[
        ("type", "file".into()),
        ("path", path.to_string_lossy().into_owned().into()),
    ]);

    let supplier = factory.create(&d).unwrap();
    assert_eq!(supplier.get(Path::new("a")).unwrap(), Value::Int(1));
}

#[cfg(feature = "yaml")]
#[test]
fn test_descriptions_decoded_from_yaml() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.yaml");
    fs::write(&data, "Feature:\n  Enabled: true\n").unwrap();

    let yaml = format!(
        "type: observable-file\npath: {}\nformat: yaml\n",
        data.display()
    );
    let d = DecoderFactory::default()
        .decode("yaml", std::io::Cursor::new(yaml.into_bytes()))
        .unwrap();

    let factory = SupplierFactory::with_defaults(decoders(), &Options::default(), None);
    let mut supplier = factory.create(&d).unwrap();

    assert_eq!(
        supplier.get(Path::new("feature.enabled")).unwrap(),
        Value::Bool(true)
    );
    assert!(supplier.as_observable().is_some());
}

#[test]
fn test_dir_description_recursive_flag() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/a.json"), r#"{"a": 1}"#).unwrap();

    let factory = SupplierFactory::with_defaults(decoders(), &Options::default(), None);
    let d = description(&[
        ("type", "dir".into()),
        ("path", dir.path().to_string_lossy().into_owned().into()),
        ("recursive", true.into()),
    ]);

    let supplier = factory.create(&d).unwrap();
    assert!(supplier.has(Path::new("a")));
}

// ============================================================================
// REST
// ============================================================================

const URI: &str = "http://config.local/app";

struct FakeHttp {
    body: Mutex<String>,
    calls: AtomicUsize,
}

impl FakeHttp {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: Mutex::new(body.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn respond(&self, body: &str) {
        *self.body.lock() = body.to_string();
    }
}

impl HttpClient for FakeHttp {
    fn get(&self, uri: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if uri != URI {
            return Err(Error::http(uri, "404 Not Found"));
        }
        Ok(self.body.lock().clone().into_bytes())
    }
}

fn response(port: i64, updated: &str) -> String {
    format!(r#"{{"data": {{"config": {{"Port": {port}}}}}, "meta": {{"updated": "{updated}"}}}}"#)
}

#[test]
fn test_rest_supplier_extracts_subtree() {
    let http = FakeHttp::new(&response(80, "2024-05-01T12:00:00Z"));
    let supplier =
        RestSupplier::new(Endpoint::new(URI, "data.config"), http.as_ref(), &decoders()).unwrap();

    assert_eq!(supplier.get(Path::new("port")).unwrap(), Value::Int(80));
    assert!(!supplier.has(Path::new("meta")));
}

#[test]
fn test_rest_supplier_failures_abort_construction() {
    let http = FakeHttp::new(&response(80, "2024-05-01T12:00:00Z"));

    let bad_uri = RestSupplier::new(
        Endpoint::new("http://elsewhere", "data.config"),
        http.as_ref(),
        &decoders(),
    );
    assert!(matches!(bad_uri, Err(Error::Http { .. })));

    let bad_path = RestSupplier::new(Endpoint::new(URI, "data.absent"), http.as_ref(), &decoders());
    assert!(matches!(bad_path, Err(Error::PathNotFound { .. })));
}

#[test]
fn test_observable_rest_reloads_on_newer_timestamp() {
    let http = FakeHttp::new(&response(80, "2024-05-01T12:00:00Z"));
    let client: Arc<dyn HttpClient> = http.clone();

    let mut supplier = ObservableRestSupplier::new(
        Endpoint::new(URI, "data.config"),
        "meta.updated",
        client,
        decoders(),
    )
    .unwrap();

    assert!(supplier.reload().unwrap(), "first reload always loads");
    assert!(!supplier.reload().unwrap());

    http.respond(&response(81, "2024-05-01T11:00:00Z"));
    assert!(!supplier.reload().unwrap(), "older timestamp is ignored");
    assert_eq!(supplier.get(Path::new("port")).unwrap(), Value::Int(80));

    http.respond(&response(82, "2024-05-01T13:00:00+00:00"));
    assert!(supplier.reload().unwrap());
    assert_eq!(supplier.get(Path::new("port")).unwrap(), Value::Int(82));
    assert_eq!(http.calls.load(Ordering::SeqCst), 5);
}

#[test]
fn test_observable_rest_rejects_bad_timestamp() {
    let http = FakeHttp::new(&response(80, "yesterday"));
    let client: Arc<dyn HttpClient> = http;

    let err = ObservableRestSupplier::new(
        Endpoint::new(URI, "data.config"),
        "meta.updated",
        client,
        decoders(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Timestamp { .. }));
}

#[test]
fn test_rest_descriptions_need_client_and_fields() {
    let http = FakeHttp::new(&response(80, "2024-05-01T12:00:00Z"));
    let client: Arc<dyn HttpClient> = http;
    let factory = SupplierFactory::with_defaults(decoders(), &Options::default(), Some(client));

    let rest = description(&[
        ("type", "rest".into()),
        ("uri", URI.into()),
        ("path.config", "data.config".into()),
    ]);
    assert_eq!(
        factory.create(&rest).unwrap().get(Path::new("port")).unwrap(),
        Value::Int(80)
    );

    let missing = description(&[
        ("type", "observable-rest".into()),
        ("uri", URI.into()),
        ("path.config", "data.config".into()),
    ]);
    let err = factory.create(&missing).err().unwrap();
    assert!(matches!(
        err,
        Error::MissingField {
            kind: "observable-rest",
            field: "path.timestamp"
        }
    ));
}

// ============================================================================
// Aggregate
// ============================================================================

#[test]
fn test_aggregate_creator_composes_children() {
    let mut factory = SupplierFactory::empty();
    factory.register(AggregateCreator::new(|d: &Partial| {
        let tag = d.string("tag")?;
        let mut base = Partial::new();
        base.set("tag", tag)?;
        base.set("a.x", 1)?;
        let mut overlay = Partial::new();
        overlay.set("a.x", 2)?;

        Ok(vec![
            Box::new(PartialSupplier::new(base)) as Box<dyn Supplier>,
            Box::new(PartialSupplier::new(overlay)),
        ])
    }));

    let d = description(&[("type", "aggregate".into()), ("tag", "core".into())]);
    let supplier = factory.create(&d).unwrap();

    assert_eq!(supplier.get(Path::new("a.x")).unwrap(), Value::Int(2));
    assert_eq!(supplier.get(Path::new("tag")).unwrap(), Value::from("core"));
}
