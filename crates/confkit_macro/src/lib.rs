//! # confkit_macro
//!
//! Procedural macro implementation for the `confkit` crate.
//!
//! This crate provides `#[derive(Populate)]`, which implements
//! `confkit::Populate` by listing each field's key once, at compile time.
//!
//! **Note:** Users should depend on the `confkit` crate, not this one
//! directly. `confkit` re-exports this macro behind its `derive` feature.
//!
//! # Module Structure
//!
//! - `parse` - `#[populate(...)]` field attribute parsing
//! - `expand` - `impl Populate` generation

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod expand;
mod parse;

/// Derive macro mapping a tree onto a struct's fields.
///
/// Each named field is filled from the key of the same name. Keys absent
/// from the tree leave the field untouched, so start from a value holding
/// your defaults.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `key = "name"` | Read from `name` instead of the field name |
/// | `nested` | The field is itself `Populate`; recurse into the subtree |
/// | `skip` | Never touch this field |
///
/// Leaf fields must implement `confkit::FromValue`.
///
/// # Example
///
/// ```ignore
/// use confkit::Populate;
///
/// #[derive(Default, Populate)]
/// struct Database {
///     url: String,
///     #[populate(key = "pool_size")]
///     pool: u32,
/// }
///
/// #[derive(Default, Populate)]
/// struct Config {
///     name: String,
///     #[populate(nested)]
///     database: Database,
///     #[populate(skip)]
///     cache: Vec<u8>,
/// }
///
/// let mut config = Config::default();
/// manager.populate("", &mut config, true)?;
/// ```
#[proc_macro_derive(Populate, attributes(populate))]
pub fn derive_populate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand::expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
