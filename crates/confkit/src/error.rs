//! Error types for the configuration engine.
//!
//! Every fallible operation in this crate returns [`Error`], which integrates
//! with [`miette`] for rich diagnostics. Decode errors carry the offending
//! document as source code so the failing line can be rendered.
//!
//! # Error Variants
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::PathNotFound`] | Read of an absent path without a default |
//! | [`Error::EmptyPath`] | Set (or tree-level get) at the root path |
//! | [`Error::Conversion`] | Typed accessor or populate target mismatch |
//! | [`Error::InvalidFormat`] | No decoder creator accepts a format name |
//! | [`Error::InvalidSupplier`] | No supplier creator accepts a description |
//! | [`Error::MissingField`] | A supplier description lacks a required field |
//! | [`Error::DuplicateSupplier`] | A supplier id is already registered |
//! | [`Error::SupplierNotFound`] | An operation references an unknown id |
//! | [`Error::Io`] | Filesystem failure, surfaced unwrapped |
//! | [`Error::Decode`] | A document failed to parse |
//! | [`Error::Http`] | A REST request failed |
//! | [`Error::Closed`] | A poll fired after its manager was dropped |

use std::error::Error as StdError;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error as ThisError;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the value tree, decoders, suppliers and the manager.
#[derive(Debug, ThisError, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// The requested path does not exist in the tree.
    #[error("path not found: {path}")]
    #[diagnostic(
        code(confkit::path_not_found),
        help("check the path spelling; decoded keys are lower-case")
    )]
    PathNotFound {
        /// The path that was requested.
        path: String,
    },

    /// A write (or tree-level read) was attempted at the root path.
    #[error("path must contain at least one segment")]
    #[diagnostic(code(confkit::empty_path))]
    EmptyPath,

    /// A value could not be converted to the requested type.
    #[error("cannot convert `{path}` to {expected}: found {found}")]
    #[diagnostic(code(confkit::conversion))]
    Conversion {
        /// The path holding the value.
        path: String,

        /// The requested target type.
        expected: &'static str,

        /// The dynamic type of the stored value.
        found: &'static str,

        /// Dynamic help text naming the target type.
        #[help]
        help: String,
    },

    /// No registered decoder accepts the requested format.
    #[error("invalid format: {format}")]
    #[diagnostic(
        code(confkit::invalid_format),
        help("register a decoder creator for this format or enable its feature flag")
    )]
    InvalidFormat {
        /// The format name that was requested.
        format: String,
    },

    /// No registered supplier creator accepts the description.
    #[error("invalid supplier: {reason}")]
    #[diagnostic(
        code(confkit::invalid_supplier),
        help("valid types are: aggregate, env, file, observable-file, dir, rest, observable-rest")
    )]
    InvalidSupplier {
        /// Why the description was rejected.
        reason: String,
    },

    /// A supplier description lacks a required field.
    #[error("invalid supplier: `{kind}` description is missing `{field}`")]
    #[diagnostic(code(confkit::missing_field))]
    MissingField {
        /// The supplier type being described.
        kind: &'static str,

        /// The missing field.
        field: &'static str,
    },

    /// A supplier with the same id is already registered.
    #[error("duplicate supplier: {id}")]
    #[diagnostic(
        code(confkit::duplicate_supplier),
        help("remove the existing supplier first or pick another id")
    )]
    DuplicateSupplier {
        /// The conflicting id.
        id: String,
    },

    /// No supplier is registered under the id.
    #[error("supplier not found: {id}")]
    #[diagnostic(code(confkit::supplier_not_found))]
    SupplierNotFound {
        /// The unknown id.
        id: String,
    },

    /// The configuration manager has been dropped.
    #[error("configuration manager is closed")]
    #[diagnostic(code(confkit::closed))]
    Closed,

    /// Filesystem failure.
    #[error(transparent)]
    #[diagnostic(code(confkit::io))]
    Io(#[from] std::io::Error),

    /// Parse error with source location.
    #[error("{format} parse error in {origin}")]
    #[diagnostic(code(confkit::decode))]
    Decode {
        /// Format name (JSON, TOML, YAML).
        format: &'static str,

        /// Where the document came from.
        origin: String,

        /// The document content for display.
        #[source_code]
        src: NamedSource<String>,

        /// The location of the error.
        #[label("{message}")]
        span: SourceSpan,

        /// Description of what went wrong.
        message: String,

        /// Suggestion for how to fix.
        #[help]
        help: String,
    },

    /// Parse error without source location (fallback).
    #[error("{format} parse error: {message}")]
    #[diagnostic(code(confkit::decode))]
    DecodeNoSpan {
        /// Format name.
        format: &'static str,

        /// Description of what went wrong.
        message: String,

        /// Suggestion for how to fix.
        #[help]
        help: String,
    },

    /// The decoded document root is not a mapping.
    #[error("{format} document root must be a mapping, found {found}")]
    #[diagnostic(code(confkit::not_a_tree))]
    NotATree {
        /// Format name.
        format: &'static str,

        /// The dynamic type of the root.
        found: &'static str,
    },

    /// A REST request failed.
    #[error("request to {uri} failed: {message}")]
    #[diagnostic(
        code(confkit::http),
        help("check the endpoint URI and connectivity")
    )]
    Http {
        /// The requested URI.
        uri: String,

        /// The error message.
        message: String,

        /// The underlying client error.
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// A timestamp field did not parse as RFC 3339.
    #[error("invalid timestamp {value:?}")]
    #[diagnostic(
        code(confkit::timestamp),
        help("timestamps must be RFC 3339, e.g. 2024-05-01T12:00:00Z")
    )]
    Timestamp {
        /// The raw timestamp value.
        value: String,

        /// The parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// Serde extraction of a typed value failed.
    #[error("cannot deserialize `{path}`: {message}")]
    #[diagnostic(code(confkit::deserialize))]
    Deserialize {
        /// Full path of the failing field.
        path: String,

        /// The serde error message.
        message: String,
    },

    /// A background trigger thread could not be started.
    #[error("failed to start trigger: {message}")]
    #[diagnostic(code(confkit::trigger))]
    Trigger {
        /// Human-readable error message.
        message: String,

        /// The spawn failure.
        #[source]
        source: std::io::Error,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Constructor helpers for ergonomic error creation
// ─────────────────────────────────────────────────────────────────────────────

impl Error {
    /// Creates a `PathNotFound` error.
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Error::PathNotFound { path: path.into() }
    }

    /// Creates a `Conversion` error with help text naming the target type.
    pub fn conversion(path: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Error::Conversion {
            path: path.into(),
            expected,
            found,
            help: format!("store a {expected} at this path or read it with a matching accessor"),
        }
    }

    /// Creates an `InvalidFormat` error.
    pub fn invalid_format(format: impl Into<String>) -> Self {
        Error::InvalidFormat {
            format: format.into(),
        }
    }

    /// Creates an `InvalidSupplier` error.
    pub fn invalid_supplier(reason: impl Into<String>) -> Self {
        Error::InvalidSupplier {
            reason: reason.into(),
        }
    }

    /// Creates a `MissingField` error.
    #[must_use]
    pub const fn missing_field(kind: &'static str, field: &'static str) -> Self {
        Error::MissingField { kind, field }
    }

    /// Creates an `Http` error without an underlying source.
    pub fn http(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Http {
            uri: uri.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates an `Http` error wrapping the client failure.
    pub fn http_with_source(
        uri: impl Into<String>,
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Error::Http {
            uri: uri.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` for the "path not found" family of errors.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::PathNotFound { .. } | Error::EmptyPath)
    }
}
