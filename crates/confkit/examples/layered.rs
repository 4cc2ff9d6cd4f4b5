//! Layered configuration built from declarative supplier descriptions.
//!
//! A YAML document lists the suppliers; each entry becomes a supplier through
//! the [`SupplierFactory`] and is registered at its own priority. Defaults
//! come from a YAML file, environment variables override them.
//!
//! # Running
//!
//! ```bash
//! LAYERED_PORT=9443 cargo run --example layered
//! ```

use std::fs;
use std::sync::Arc;

use confkit::{ConfigManager, DecoderFactory, Options, Populate, SupplierFactory, Value};

#[derive(Debug, Default, Populate)]
struct Database {
    url: String,
    #[populate(key = "pool_size")]
    pool: u32,
}

#[derive(Debug, Default, Populate)]
struct Server {
    host: String,
    port: u16,
    #[populate(nested)]
    database: Database,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join("confkit_layered");
    fs::create_dir_all(&dir)?;

    let defaults = dir.join("defaults.yaml");
    fs::write(
        &defaults,
        "server:\n  host: 0.0.0.0\n  port: 8080\n  database:\n    url: postgres://localhost/app\n    pool_size: 4\n",
    )?;

    let layout = format!(
        "suppliers:\n\
         \x20 defaults:\n\
         \x20   priority: 0\n\
         \x20   type: file\n\
         \x20   format: yaml\n\
         \x20   path: {}\n\
         \x20 environment:\n\
         \x20   priority: 10\n\
         \x20   type: env\n\
         \x20   mappings:\n\
         \x20     LAYERED_PORT: server.port\n\
         \x20     LAYERED_DATABASE_URL: server.database.url\n",
        defaults.display()
    );

    let decoders = Arc::new(DecoderFactory::default());
    let options = Options::default().with_format("yaml");
    let factory = SupplierFactory::with_defaults(Arc::clone(&decoders), &options, None);
    let manager = ConfigManager::new(options)?;

    let layout = decoders.decode("yaml", std::io::Cursor::new(layout.into_bytes()))?;
    for (id, description) in layout.partial("suppliers")? {
        let Value::Partial(description) = description else {
            continue;
        };

        let priority = description.get_as_or::<i64>("priority", 0)?;
        manager.add_supplier(id.as_str(), priority, factory.create(description)?)?;
        println!("registered {id} at priority {priority}");
    }

    let mut server = Server::default();
    manager.populate("server", &mut server, true)?;
    println!("{server:#?}");

    manager.close()?;
    let _ = fs::remove_dir_all(&dir);

    Ok(())
}
