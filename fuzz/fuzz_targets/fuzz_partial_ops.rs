#![no_main]

use arbitrary::Arbitrary;
use confkit::{Partial, Path, Value};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    Set(String, i64),
    SetText(String, String),
    Remove(String),
    Get(String),
    Merge(Vec<(String, i64)>),
    Normalize,
}

#[derive(Arbitrary, Debug)]
struct Input {
    separator: char,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let sep = input.separator;
    let mut tree = Partial::new();

    for op in input.ops {
        match op {
            Op::Set(path, n) => {
                let path = Path::with_separator(&path, sep);
                // === Set then get must agree ===
                if tree.set(path, n).is_ok() {
                    assert_eq!(tree.get(path).ok(), Some(&Value::Int(n)));
                }
            }
            Op::SetText(path, s) => {
                let _ = tree.set(Path::with_separator(&path, sep), s);
            }
            Op::Remove(path) => {
                let path = Path::with_separator(&path, sep);
                let _ = tree.remove(path);
                assert!(path.is_root() || !tree.has(path));
            }
            Op::Get(path) => {
                let path = Path::with_separator(&path, sep);
                let _ = tree.get(path);
                let _ = tree.int(path);
                let _ = tree.partial(path);
            }
            Op::Merge(pairs) => {
                let mut other = Partial::new();
                for (path, n) in pairs {
                    let _ = other.set(Path::with_separator(&path, sep), n);
                }
                tree.merge(other);
            }
            Op::Normalize => {
                tree = tree.normalized();
            }
        }
    }
});
