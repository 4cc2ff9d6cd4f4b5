//! Mapping parser failures onto source spans for miette rendering.

use miette::{NamedSource, SourceSpan};

use crate::Error;

/// Name given to decoded content; decoders see bytes, not file names.
pub(crate) const ORIGIN: &str = "<input>";

/// Converts a byte offset to a [`SourceSpan`] covering the token there.
pub(crate) fn offset_to_span(offset: usize, content: &str) -> SourceSpan {
    let offset = offset.min(content.len());
    let remaining = content.get(offset..).unwrap_or_default();
    let len = remaining
        .find(|c: char| c.is_whitespace() || c == ',' || c == '}' || c == ']')
        .unwrap_or_else(|| remaining.len().min(20))
        .max(1);

    SourceSpan::new(offset.into(), len)
}

/// Converts a 1-indexed line/column pair to a byte offset.
pub(crate) fn line_col_to_offset(content: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;

    // Segments keep their terminators so CRLF input counts both bytes.
    for (i, l) in content.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return offset + col.saturating_sub(1);
        }

        offset += l.len();
    }

    offset.min(content.len())
}

/// Builds a spanned decode error.
pub(crate) fn spanned(
    format: &'static str,
    content: &str,
    span: SourceSpan,
    message: String,
    help: &str,
) -> Error {
    Error::Decode {
        format,
        origin: ORIGIN.to_string(),
        src: NamedSource::new(ORIGIN, content.to_string()),
        span,
        message,
        help: help.to_string(),
    }
}

pub(crate) fn json_error(e: &serde_json::Error, content: &str) -> Error {
    let offset = line_col_to_offset(content, e.line(), e.column());
    spanned(
        "JSON",
        content,
        offset_to_span(offset, content),
        e.to_string(),
        "check for missing commas, quotes, or brackets",
    )
}

/// Extracts "line N column M" from an error message.
#[cfg(feature = "yaml")]
pub(crate) fn extract_location(msg: &str) -> Option<(usize, usize)> {
    let line_idx = msg.find("line ")?;
    let after_line = &msg[line_idx + 5..];
    let line_end = after_line.find(|c: char| !c.is_ascii_digit())?;
    let line = after_line[..line_end].parse::<usize>().ok()?;

    let col_idx = after_line.find("column ")?;
    let after_col = &after_line[col_idx + 7..];
    let col_end = after_col
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_col.len());
    let col = after_col[..col_end].parse::<usize>().ok()?;

    Some((line, col))
}

#[cfg(feature = "yaml")]
pub(crate) fn yaml_error(e: &serde_saphyr::Error, content: &str) -> Error {
    const HELP: &str = "check indentation and ensure proper YAML syntax";
    let message = e.to_string();

    match extract_location(&message) {
        Some((line, col)) => {
            let offset = line_col_to_offset(content, line, col);
            spanned("YAML", content, offset_to_span(offset, content), message, HELP)
        }
        None => Error::DecodeNoSpan {
            format: "YAML",
            message,
            help: HELP.to_string(),
        },
    }
}

#[cfg(feature = "toml")]
pub(crate) fn toml_error(e: &toml::de::Error, content: &str) -> Error {
    const HELP: &str = "check for missing quotes, invalid values, or syntax errors";

    match e.span() {
        Some(span) => spanned(
            "TOML",
            content,
            SourceSpan::new(span.start.into(), span.end - span.start),
            e.message().to_string(),
            HELP,
        ),
        None => Error::DecodeNoSpan {
            format: "TOML",
            message: e.to_string(),
            help: HELP.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let content = "a\nbc\ndef";
        assert_eq!(line_col_to_offset(content, 1, 1), 0);
        assert_eq!(line_col_to_offset(content, 2, 2), 3);
        assert_eq!(line_col_to_offset(content, 3, 1), 5);
        assert_eq!(line_col_to_offset(content, 9, 1), content.len());
    }

    #[test]
    fn test_line_col_to_offset_crlf() {
        let content = "a\r\nbc\r\ndef";
        assert_eq!(line_col_to_offset(content, 2, 1), 3);
        assert_eq!(line_col_to_offset(content, 3, 2), 8);
    }

    #[test]
    fn test_json_error_span_crlf() {
        let content = "{\r\n\"a\": 1,\r\n\"b\": }\r\n";
        let Err(e) = serde_json::from_str::<serde_json::Value>(content) else {
            panic!("expected a syntax error");
        };

        let Error::Decode { span, .. } = json_error(&e, content) else {
            panic!("expected a spanned error");
        };
        assert_eq!(Some(span.offset()), content.rfind('}'));
    }

    #[test]
    fn test_offset_to_span_stops_at_delimiter() {
        let content = r#"{"a": bad, "b": 1}"#;
        let span = offset_to_span(6, content);
        assert_eq!(span.offset(), 6);
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let span = offset_to_span(100, "abc");
        assert_eq!(span.offset(), 3);
        assert_eq!(span.len(), 1);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_extract_location() {
        assert_eq!(
            extract_location("mapping values are not allowed at line 3 column 7"),
            Some((3, 7))
        );
        assert_eq!(extract_location("no location here"), None);
    }
}
