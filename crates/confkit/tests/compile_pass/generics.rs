use confkit::{FromValue, Partial, Populate};

#[derive(Default, Populate)]
struct Setting<T: FromValue + Default> {
    value: T,
}

fn main() {
    let mut tree = Partial::new();
    tree.set("value", 0.5).unwrap();

    let mut setting = Setting::<f64>::default();
    tree.populate("", &mut setting, false).unwrap();
    assert_eq!(setting.value, 0.5);
}
