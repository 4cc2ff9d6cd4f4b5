#![no_main]

use confkit::Value;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // === Inference must never panic ===
    let value = Value::from_str_infer(data);

    let _ = format!("{value}");
    let _ = value.type_name();
    let _ = value.as_bool();
    let _ = value.as_int();
    let _ = value.as_float();
    let _ = value.as_str();

    // === Normalisation is a no-op on inferred values ===
    assert_eq!(value.clone().normalized(), value);
});
