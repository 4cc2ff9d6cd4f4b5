use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use super::{
    DirCreator, EnvCreator, FileCreator, HttpClient, ObservableFileCreator,
    ObservableRestCreator, RestCreator, Supplier,
};
use crate::{DecoderFactory, Error, Options, Partial, Result, Value};

/// Field carrying the supplier kind in a description.
pub(crate) const TYPE_FIELD: &str = "type";

/// Builds suppliers from declarative descriptions.
pub trait SupplierCreator: Send + Sync {
    /// Returns `true` if this creator handles `description`, usually by
    /// matching its `type` field.
    fn accepts(&self, description: &Partial) -> bool;

    /// Validates the description and constructs the supplier, loading its
    /// initial content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for an absent required field, or the
    /// failure of the initial load.
    fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>>;
}

/// Selects a supplier creator for a description.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use confkit::{DecoderFactory, Options, Partial, Path, SupplierFactory};
///
/// let factory = SupplierFactory::with_defaults(
///     Arc::new(DecoderFactory::default()),
///     &Options::default(),
///     None,
/// );
///
/// let mut description = Partial::new();
/// description.set("type", "env")?;
/// description.set("mappings.CONFKIT_DOC_UNSET", "app.name")?;
///
/// let supplier = factory.create(&description)?;
/// assert!(!supplier.has(Path::new("app.name")));
/// # Ok::<(), confkit::Error>(())
/// ```
pub struct SupplierFactory {
    creators: Vec<Box<dyn SupplierCreator>>,
}

impl SupplierFactory {
    /// Creates a factory with no creators registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            creators: Vec::new(),
        }
    }

    /// Creates a factory with the built-in creators.
    ///
    /// `env`, `file`, `observable-file` and `dir` are always registered.
    /// `rest` and `observable-rest` are registered only when an HTTP client
    /// is given. `aggregate` needs a child source and is never registered
    /// here; see [`AggregateCreator`](super::AggregateCreator).
    #[must_use]
    pub fn with_defaults(
        decoders: Arc<DecoderFactory>,
        options: &Options,
        http: Option<Arc<dyn HttpClient>>,
    ) -> Self {
        let mut factory = Self::empty();
        factory
            .register(EnvCreator::new(options.separator))
            .register(FileCreator::new(Arc::clone(&decoders), &options.format))
            .register(ObservableFileCreator::new(
                Arc::clone(&decoders),
                &options.format,
            ))
            .register(DirCreator::new(Arc::clone(&decoders), &options.format));

        if let Some(client) = http {
            factory
                .register(RestCreator::new(
                    Arc::clone(&client),
                    Arc::clone(&decoders),
                    options,
                ))
                .register(ObservableRestCreator::new(client, decoders, options));
        }

        factory
    }

    /// Appends a creator; earlier registrations take precedence.
    pub fn register(&mut self, creator: impl SupplierCreator + 'static) -> &mut Self {
        self.creators.push(Box::new(creator));
        self
    }

    /// Returns `true` if some creator accepts `description`.
    #[must_use]
    pub fn accepts(&self, description: &Partial) -> bool {
        self.creators.iter().any(|c| c.accepts(description))
    }

    /// Creates the supplier described by `description`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSupplier`] if no creator accepts the
    /// description, or the accepting creator's failure.
    pub fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>> {
        let creator = self
            .creators
            .iter()
            .find(|c| c.accepts(description))
            .ok_or_else(|| match description.string(TYPE_FIELD) {
                Ok(kind) => Error::invalid_supplier(format!("no supplier accepts type `{kind}`")),
                Err(_) => Error::invalid_supplier("description has no `type`"),
            })?;

        creator.create(description)
    }
}

impl Debug for SupplierFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplierFactory")
            .field("creators", &self.creators.len())
            .finish()
    }
}

// ============================================================================
// Description helpers
// ============================================================================

/// Returns `true` if the description's `type` equals `kind`.
pub(crate) fn has_type(description: &Partial, kind: &str) -> bool {
    description
        .string(TYPE_FIELD)
        .is_ok_and(|t| t.eq_ignore_ascii_case(kind))
}

/// Looks up an optional field.
fn field<'d>(description: &'d Partial, field: &'static str) -> Option<&'d Value> {
    description.get(field).ok()
}

/// Reads a required string field.
pub(crate) fn required_str<'d>(
    description: &'d Partial,
    kind: &'static str,
    name: &'static str,
) -> Result<&'d str> {
    let value = field(description, name).ok_or(Error::missing_field(kind, name))?;
    value
        .as_str()
        .ok_or_else(|| Error::conversion(name, "string", value.type_name()))
}

/// Reads an optional string field, falling back to `default`.
pub(crate) fn optional_str<'d>(
    description: &'d Partial,
    name: &'static str,
    default: &'d str,
) -> Result<&'d str> {
    match field(description, name) {
        None => Ok(default),
        Some(value) => value
            .as_str()
            .ok_or_else(|| Error::conversion(name, "string", value.type_name())),
    }
}

/// Reads an optional boolean field, falling back to `default`.
pub(crate) fn optional_bool(description: &Partial, name: &'static str, default: bool) -> Result<bool> {
    match field(description, name) {
        None => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| Error::conversion(name, "bool", value.type_name())),
    }
}

/// Reads a required tree field.
pub(crate) fn required_tree<'d>(
    description: &'d Partial,
    kind: &'static str,
    name: &'static str,
) -> Result<&'d Partial> {
    let value = field(description, name).ok_or(Error::missing_field(kind, name))?;
    value
        .as_partial()
        .ok_or_else(|| Error::conversion(name, "partial", value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Path;
    use crate::supplier::PartialSupplier;

    struct Fixed(&'static str, i64);

    impl SupplierCreator for Fixed {
        fn accepts(&self, description: &Partial) -> bool {
            has_type(description, self.0)
        }

        fn create(&self, _description: &Partial) -> Result<Box<dyn Supplier>> {
            let mut tree = Partial::new();
            tree.set("marker", self.1)?;
            Ok(Box::new(PartialSupplier::new(tree)))
        }
    }

    fn described(kind: &str) -> Partial {
        let mut description = Partial::new();
        description.set(TYPE_FIELD, kind).unwrap();
        description
    }

    #[test]
    fn test_first_acceptor_wins() {
        let mut factory = SupplierFactory::empty();
        factory.register(Fixed("memory", 1)).register(Fixed("memory", 2));

        let supplier = factory.create(&described("memory")).unwrap();
        assert_eq!(supplier.get(Path::new("marker")).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_unknown_type_is_invalid_supplier() {
        let factory = SupplierFactory::empty();
        let err = factory.create(&described("consul")).err().unwrap();
        assert!(matches!(err, Error::InvalidSupplier { reason } if reason.contains("consul")));

        let err = factory.create(&Partial::new()).err().unwrap();
        assert!(matches!(err, Error::InvalidSupplier { .. }));
    }

    #[test]
    fn test_rest_needs_client() {
        let factory = SupplierFactory::with_defaults(
            Arc::new(DecoderFactory::default()),
            &Options::default(),
            None,
        );
        assert!(factory.accepts(&described("file")));
        assert!(factory.accepts(&described("env")));
        assert!(!factory.accepts(&described("rest")));
        assert!(!factory.accepts(&described("aggregate")));
    }

    #[test]
    fn test_required_field_names_field() {
        let description = described("file");
        let err = required_str(&description, "file", "path").unwrap_err();
        assert!(matches!(err, Error::MissingField { kind: "file", field: "path" }));
    }

    #[test]
    fn test_optional_fields() {
        let mut description = described("dir");
        description.set("recursive", true).unwrap();
        assert!(optional_bool(&description, "recursive", false).unwrap());
        assert_eq!(optional_str(&description, "format", "json").unwrap(), "json");

        description.set("format", 3).unwrap();
        assert!(optional_str(&description, "format", "json").is_err());
    }
}
