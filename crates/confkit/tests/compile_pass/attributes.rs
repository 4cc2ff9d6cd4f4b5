use confkit::{Partial, Populate};

#[derive(Default, Populate)]
struct Pool {
    #[populate(key = "max_size")]
    max: u32,
}

#[derive(Default, Populate)]
struct Config {
    r#type: String,
    #[populate(nested)]
    pool: Pool,
    #[populate(skip)]
    handle: Option<std::fs::File>,
}

fn main() {
    let mut tree = Partial::new();
    tree.set("pool.max_size", 4).unwrap();

    let mut config = Config::default();
    tree.populate("", &mut config, false).unwrap();
    assert_eq!(config.pool.max, 4);
    let _ = (config.r#type, config.handle);
}
