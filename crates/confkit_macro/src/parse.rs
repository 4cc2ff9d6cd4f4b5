//! Attribute parsing for `#[populate(...)]`.

use std::collections::HashSet;

use syn::meta::ParseNestedMeta;
use syn::{Error as SynError, Field, LitStr, Result as SynResult};

/// How a field is filled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// A leaf converted through `FromValue`.
    Leaf,

    /// A nested `Populate` record.
    Nested,

    /// Left untouched.
    Skip,
}

/// Parsed `#[populate(...)]` options for one field.
#[derive(Debug)]
pub struct FieldAttr {
    /// Tree key the field reads from.
    pub key: String,

    /// How the field is filled.
    pub mode: Mode,
}

/// Accumulates options across one attribute.
#[derive(Default)]
struct Parser {
    key: Option<String>,
    nested: bool,
    skip: bool,
    seen: HashSet<&'static str>,
}

impl Parser {
    #[expect(
        clippy::needless_pass_by_value,
        reason = "ParseNestedMeta is passed by value per syn's parse_nested_meta callback signature"
    )]
    fn parse_meta(&mut self, meta: ParseNestedMeta) -> SynResult<()> {
        let ident = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("Expected Identifier"))?;
        let name = ident.to_string();

        let key: &'static str = match name.as_str() {
            "key" => "key",
            "nested" => "nested",
            "skip" => "skip",
            _ => return Err(meta.error(format!("Unknown option `{name}`"))),
        };

        if !self.seen.insert(key) {
            return Err(meta.error(format!("Duplicate option: `{key}`")));
        }

        match key {
            "key" => {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(SynError::new_spanned(lit, "key must not be empty"));
                }
                self.key = Some(lit.value());
            }
            "nested" => self.nested = true,
            _ => self.skip = true,
        }

        Ok(())
    }
}

impl FieldAttr {
    /// Parses the field's `#[populate(...)]` attributes; none means a leaf
    /// keyed by the field name.
    pub fn parse(field: &Field) -> SynResult<Self> {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| SynError::new_spanned(field, "Populate requires named fields"))?;

        let mut parser = Parser::default();
        for attr in &field.attrs {
            if attr.path().is_ident("populate") {
                attr.parse_nested_meta(|meta| parser.parse_meta(meta))?;
            }
        }

        if parser.nested && parser.skip {
            return Err(SynError::new_spanned(
                field,
                "`nested` and `skip` cannot be combined",
            ));
        }

        let mode = if parser.skip {
            Mode::Skip
        } else if parser.nested {
            Mode::Nested
        } else {
            Mode::Leaf
        };

        let key = parser.key.unwrap_or_else(|| {
            let name = ident.to_string();
            name.strip_prefix("r#").map_or_else(|| name.clone(), str::to_string)
        });

        Ok(Self { key, mode })
    }
}
