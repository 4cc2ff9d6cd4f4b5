//! Path addressing for the value tree.
//!
//! A [`Path`] is a borrowed string split on a separator character into
//! ordered segments. Empty segments (leading, trailing or consecutive
//! separators) are skipped, so `"a..b."` addresses the same node as `"a.b"`.

use std::fmt::{self, Display, Formatter};

/// Separator used when a path is built from a plain `&str`.
pub const DEFAULT_SEPARATOR: char = '.';

/// A separator-aware view over a path string.
///
/// # Example
///
/// ```rust
/// use confkit::Path;
///
/// let path = Path::with_separator("server/http/port", '/');
/// assert_eq!(path.segments().collect::<Vec<_>>(), ["server", "http", "port"]);
///
/// let path: Path<'_> = "server.http.port".into();
/// assert_eq!(path.segments().count(), 3);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Path<'a> {
    raw: &'a str,
    separator: char,
}

impl<'a> Path<'a> {
    /// Creates a path using [`DEFAULT_SEPARATOR`].
    #[must_use]
    pub const fn new(raw: &'a str) -> Self {
        Self::with_separator(raw, DEFAULT_SEPARATOR)
    }

    /// Creates a path split on a custom separator.
    #[must_use]
    pub const fn with_separator(raw: &'a str, separator: char) -> Self {
        Self { raw, separator }
    }

    /// Iterates over the non-empty segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.raw.split(self.separator).filter(|s| !s.is_empty())
    }

    /// Returns `true` when the path has no segments and addresses the whole tree.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments().next().is_none()
    }

    /// The raw path string, as given.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.raw
    }

    /// The separator this path is split on.
    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }
}

impl Path<'static> {
    /// The empty path, addressing the whole tree.
    #[must_use]
    pub const fn root() -> Self {
        Self::new("")
    }
}

impl<'a> From<&'a str> for Path<'a> {
    fn from(raw: &'a str) -> Self {
        Self::new(raw)
    }
}

impl<'a> From<&'a String> for Path<'a> {
    fn from(raw: &'a String) -> Self {
        Self::new(raw.as_str())
    }
}

impl Display for Path<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
