use super::{Decoder, DecoderCreator, Source, diagnostic, read_source, tree_from_json};
use crate::{Partial, Result};

/// Decodes YAML documents.
pub struct YamlDecoder {
    source: Source,
}

impl YamlDecoder {
    /// Creates a decoder over `source`.
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self { source }
    }
}

impl Decoder for YamlDecoder {
    fn parse(&mut self) -> Result<Partial> {
        let content = read_source(&mut self.source)?;
        if content.trim().is_empty() {
            return Ok(Partial::new());
        }

        let json: serde_json::Value =
            serde_saphyr::from_str(&content).map_err(|e| diagnostic::yaml_error(&e, &content))?;

        tree_from_json("YAML", json)
    }
}

/// Accepts the `yaml` and `yml` format names.
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlDecoderCreator;

impl DecoderCreator for YamlDecoderCreator {
    fn accepts(&self, format: &str) -> bool {
        format.eq_ignore_ascii_case("yaml") || format.eq_ignore_ascii_case("yml")
    }

    fn create(&self, source: Source) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(YamlDecoder::new(source)))
    }
}
