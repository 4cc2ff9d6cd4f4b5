use super::{Decoder, DecoderCreator, Source, diagnostic, read_source, tree_from_json};
use crate::{Partial, Result};

/// Decodes JSON documents.
pub struct JsonDecoder {
    source: Source,
}

impl JsonDecoder {
    /// Creates a decoder over `source`.
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self { source }
    }
}

impl Decoder for JsonDecoder {
    fn parse(&mut self) -> Result<Partial> {
        let content = read_source(&mut self.source)?;
        if content.trim().is_empty() {
            return Ok(Partial::new());
        }

        let json: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| diagnostic::json_error(&e, &content))?;

        tree_from_json("JSON", json)
    }
}

/// Accepts the `json` format name.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonDecoderCreator;

impl DecoderCreator for JsonDecoderCreator {
    fn accepts(&self, format: &str) -> bool {
        format.eq_ignore_ascii_case("json")
    }

    fn create(&self, source: Source) -> Result<Box<dyn Decoder>> {
        Ok(Box::new(JsonDecoder::new(source)))
    }
}
