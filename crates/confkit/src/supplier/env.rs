use std::env;

use tracing::trace;

use super::factory::{has_type, required_tree};
use super::{Supplier, SupplierCreator, read_tree, tree_has};
use crate::{Error, Partial, Path, Result, Value};

/// Maps a fixed set of environment variables onto tree paths.
///
/// Variables are read once, at construction. Missing or empty variables are
/// skipped. Values are typed by inference: `true`/`false`, then integer,
/// then float, otherwise string. The built tree is normalised like decoded
/// content, so target paths are case-folded.
///
/// ```rust
/// use confkit::Path;
/// use confkit::supplier::{EnvSupplier, Supplier};
///
/// let supplier = EnvSupplier::new(
///     [("CONFKIT_DOC_NEVER_SET", "server.port")],
///     '.',
/// )?;
/// assert!(!supplier.has(Path::new("server.port")));
/// # Ok::<(), confkit::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct EnvSupplier {
    tree: Partial,
}

impl EnvSupplier {
    /// Reads every `(variable, path)` mapping from the process environment.
    ///
    /// A variable not found under its given name is retried upper-cased,
    /// since decoded descriptions carry lower-case keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPath`] if a set variable maps to an empty path.
    pub fn new<I, K, P>(mappings: I, separator: char) -> Result<Self>
    where
        I: IntoIterator<Item = (K, P)>,
        K: AsRef<str>,
        P: AsRef<str>,
    {
        let mut tree = Partial::new();

        for (name, path) in mappings {
            let Some(raw) = lookup(name.as_ref()) else {
                trace!(var = name.as_ref(), "environment variable not set");
                continue;
            };

            let path = Path::with_separator(path.as_ref(), separator);
            tree.set(path, Value::from_str_infer(&raw))?;
        }

        Ok(Self {
            tree: tree.normalized(),
        })
    }
}

/// Reads a non-empty variable by exact then upper-cased name.
fn lookup(name: &str) -> Option<String> {
    let read = |n: &str| env::var(n).ok().filter(|v| !v.is_empty());

    read(name).or_else(|| {
        let upper = name.to_ascii_uppercase();
        (upper != name).then(|| read(&upper)).flatten()
    })
}

impl Supplier for EnvSupplier {
    fn has(&self, path: Path<'_>) -> bool {
        tree_has(&self.tree, path)
    }

    fn get(&self, path: Path<'_>) -> Result<Value> {
        read_tree(&self.tree, path)
    }
}

/// Creates [`EnvSupplier`]s from `type: env` descriptions.
///
/// The required `mappings` field maps variable names to target paths.
#[derive(Clone, Debug)]
pub struct EnvCreator {
    separator: char,
}

impl EnvCreator {
    /// Creates a creator splitting target paths on `separator`.
    #[must_use]
    pub const fn new(separator: char) -> Self {
        Self { separator }
    }
}

impl SupplierCreator for EnvCreator {
    fn accepts(&self, description: &Partial) -> bool {
        has_type(description, "env")
    }

    fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>> {
        let mappings = required_tree(description, "env", "mappings")?;

        let pairs = mappings
            .iter()
            .map(|(name, path)| {
                let target = path.as_str().ok_or_else(|| {
                    Error::conversion(format!("mappings.{name}"), "string", path.type_name())
                })?;
                Ok((name.as_str(), target))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(EnvSupplier::new(pairs, self.separator)?))
    }
}
