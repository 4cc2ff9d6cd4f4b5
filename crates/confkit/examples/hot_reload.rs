//! Hot reload example: an observable file polled in the background.
//!
//! The example writes a JSON file, registers it as an observable supplier
//! and rewrites it twice. Each rewrite is picked up by the polling trigger
//! and reported through a path observer.
//!
//! # Running
//!
//! ```bash
//! cargo run --example hot_reload
//! ```

use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use confkit::supplier::ObservableFileSupplier;
use confkit::{ConfigManager, DecoderFactory, Options};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::temp_dir().join("confkit_hot_reload.json");
    fs::write(&config_path, r#"{"server": {"port": 8080, "host": "localhost"}}"#)?;
    println!("Config file: {}", config_path.display());

    let options = Options::default().with_poll_interval(Duration::from_millis(200));
    let manager = ConfigManager::new(options)?;

    let supplier =
        ObservableFileSupplier::new(&config_path, "json", Arc::new(DecoderFactory::default()))?;
    manager.add_supplier("file", 0, Box::new(supplier))?;

    manager.add_observer("server.port", |old, new| {
        let old = old.map_or_else(|| "<unset>".to_string(), ToString::to_string);
        println!("[RELOAD] server.port: {old} -> {new}");
    });

    println!("Initial port: {}", manager.int("server.port")?);

    for port in [9090, 10_000] {
        // Most filesystems keep whole-second mtimes; wait so the rewrite is newer.
        thread::sleep(Duration::from_millis(1100));
        fs::write(
            &config_path,
            format!(r#"{{"server": {{"port": {port}, "host": "localhost"}}}}"#),
        )?;
        thread::sleep(Duration::from_millis(500));
        println!("[POLL] epoch {} port {}", manager.epoch(), manager.int("server.port")?);
    }

    manager.close()?;
    let _ = fs::remove_file(&config_path);

    Ok(())
}
