//! Content decoders: raw bytes in, normalised [`Partial`] out.
//!
//! Each structured-text format is handled by a [`Decoder`], built by a
//! [`DecoderCreator`] that accepts one or more format names. The
//! [`DecoderFactory`] asks its creators in registration order and uses the
//! first that accepts.
//!
//! # Supported Formats
//!
//! | Format | Feature | Names |
//! |--------|---------|-------|
//! | JSON | (always) | `json` |
//! | YAML | `yaml` | `yaml`, `yml` |
//! | TOML | `toml` | `toml` |
//!
//! # Nulls
//!
//! The tree has no null value. A `null` (or YAML `~`) is dropped wherever it
//! appears: a key holding it is absent from the decoded tree, and a list
//! holding it is shortened, so later elements move to lower indices.
//!
//! # Example
//!
//! ```rust
//! use confkit::DecoderFactory;
//!
//! let factory = DecoderFactory::default();
//! let tree = factory.decode("json", &br#"{"Server": {"Port": 8080.0}}"#[..])?;
//! assert_eq!(tree.int("server.port")?, 8080);
//! # Ok::<(), confkit::Error>(())
//! ```

mod diagnostic;
mod json;
#[cfg(feature = "toml")]
mod toml;
#[cfg(feature = "yaml")]
mod yaml;

pub use json::{JsonDecoder, JsonDecoderCreator};
#[cfg(feature = "toml")]
pub use self::toml::{TomlDecoder, TomlDecoderCreator};
#[cfg(feature = "yaml")]
pub use yaml::{YamlDecoder, YamlDecoderCreator};

use std::fmt::{self, Debug, Formatter};
use std::io::Read;

use crate::{Error, Partial, Result, Value};

/// Byte source handed to a decoder.
pub type Source = Box<dyn Read + Send>;

/// Turns one byte stream into a normalised tree.
pub trait Decoder: Send {
    /// Consumes the byte source and returns the decoded tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the source cannot be read, a decode error if
    /// the content is malformed, or [`Error::NotATree`] if the document root
    /// is not a mapping.
    fn parse(&mut self) -> Result<Partial>;
}

/// Builds decoders for the formats it accepts.
pub trait DecoderCreator: Send + Sync {
    /// Returns `true` if this creator handles `format`.
    fn accepts(&self, format: &str) -> bool;

    /// Creates a decoder reading from `source`.
    ///
    /// # Errors
    ///
    /// Implementations may reject sources they cannot handle.
    fn create(&self, source: Source) -> Result<Box<dyn Decoder>>;
}

/// Selects a decoder by format name from registered creators.
pub struct DecoderFactory {
    creators: Vec<Box<dyn DecoderCreator>>,
}

impl DecoderFactory {
    /// Creates a factory with no creators registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            creators: Vec::new(),
        }
    }

    /// Appends a creator; earlier registrations take precedence.
    pub fn register(&mut self, creator: impl DecoderCreator + 'static) -> &mut Self {
        self.creators.push(Box::new(creator));
        self
    }

    /// Returns `true` if some creator accepts `format`.
    #[must_use]
    pub fn supports(&self, format: &str) -> bool {
        self.creators.iter().any(|c| c.accepts(format))
    }

    /// Creates a decoder for `format` reading from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if no creator accepts the format.
    pub fn create(&self, format: &str, source: Source) -> Result<Box<dyn Decoder>> {
        self.creators
            .iter()
            .find(|c| c.accepts(format))
            .ok_or_else(|| Error::invalid_format(format))?
            .create(source)
    }

    /// Creates a decoder for `format` and runs it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] or any decode failure.
    pub fn decode(&self, format: &str, source: impl Read + Send + 'static) -> Result<Partial> {
        self.create(format, Box::new(source))?.parse()
    }
}

impl Default for DecoderFactory {
    /// A factory with every compiled-in format registered.
    fn default() -> Self {
        let mut factory = Self::empty();
        factory.register(JsonDecoderCreator);

        #[cfg(feature = "yaml")]
        factory.register(YamlDecoderCreator);

        #[cfg(feature = "toml")]
        factory.register(TomlDecoderCreator);

        factory
    }
}

impl Debug for DecoderFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderFactory")
            .field("creators", &self.creators.len())
            .finish()
    }
}

/// Reads the whole source as UTF-8 text.
pub(crate) fn read_source(source: &mut Source) -> Result<String> {
    let mut content = String::new();
    source.read_to_string(&mut content)?;
    Ok(content)
}

/// Converts a decoded JSON document into a normalised tree.
///
/// An empty document decodes to `null` and yields an empty tree.
pub(crate) fn tree_from_json(format: &'static str, json: serde_json::Value) -> Result<Partial> {
    match Value::from_json(json) {
        None => Ok(Partial::new()),
        Some(Value::Partial(tree)) => Ok(tree.normalized()),
        Some(other) => Err(Error::NotATree {
            format,
            found: other.type_name(),
        }),
    }
}
