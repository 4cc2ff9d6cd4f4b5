#![no_main]

use std::io::Cursor;

use confkit::{DecoderFactory, miette};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let factory = DecoderFactory::default();

    // === Malformed input must yield an error, never a panic ===
    match factory.decode("toml", Cursor::new(data.to_vec())) {
        Ok(tree) => {
            // === Decoded keys are lower-cased ===
            for (key, _) in &tree {
                assert_eq!(key, &key.to_lowercase());
            }
        }
        Err(err) => {
            // === Rendering the diagnostic must not panic ===
            let _ = format!("{:?}", miette::Report::new(err));
        }
    }
});
