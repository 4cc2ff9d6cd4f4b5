use confkit::{Partial, Populate};

#[derive(Default, Populate)]
struct Config {
    host: String,
    port: u16,
    verbose: bool,
}

fn main() {
    let mut tree = Partial::new();
    tree.set("port", 8080).unwrap();

    let mut config = Config::default();
    tree.populate("", &mut config, true).unwrap();
    assert_eq!(config.port, 8080);
    let _ = (config.host, config.verbose);
}
