use toml::{Table, Value as TOML};

use super::{Decoder, DecoderCreator, Source, diagnostic, read_source};
use crate::{Partial, Result, Value};

/// Decodes TOML documents.
///
/// TOML has no null, and its datetimes are kept as their string form.
pub struct TomlDecoder {
    source: Source,
}

impl TomlDecoder {
    /// Creates a decoder over `source`.
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self { source }
    }

    fn convert(toml: TOML) -> Value {
        match toml {
            TOML::String(s) => Value::String(s),
            TOML::Integer(i) => Value::Int(i),
            TOML::Float(f) => Value::Float(f),
            TOML::Boolean(b) => Value::Bool(b),
            TOML::Datetime(dt) => Value::String(dt.to_string()),
            TOML::Array(items) => Value::List(items.into_iter().map(Self::convert).collect()),
            TOML::Table(table) => Value::Partial(Self::convert_table(table)),
        }
    }

    fn convert_table(table: Table) -> Partial {
        table
            .into_iter()
            .map(|(k, v)| (k, Self::convert(v)))
            .collect()
    }
}

impl Decoder for TomlDecoder {
    fn parse(&mut self) -> Result<Partial> {
        let content = read_source(&mut self.source)?;
        let table: Table =
            toml::from_str(&content).map_err(|e| diagnostic::toml_error(&e, &content))?;

        Ok(Self::convert_table(table).normalized())
    }
}

/// Accepts the `toml` format name.
#[derive(Clone, Copy, Debug, Default)]
pub struct TomlDecoderCreator;

impl DecoderCreator for TomlDecoderCreator {
    fn accepts(&self, format: &str) -> bool {
        format.eq_ignore_ascii_case("toml")
    }

    fn create(&self, source: Source) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(TomlDecoder::new(source)))
    }
}
