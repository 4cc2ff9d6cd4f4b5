//! Tuning parameters for the engine.
//!
//! [`Options`] replaces process-wide defaults: it is handed to
//! [`ConfigManager::new`](crate::ConfigManager::new) and to
//! [`SupplierFactory::with_defaults`](crate::SupplierFactory::with_defaults).
//!
//! Options deserialize from a tree, so the engine can be tuned by its own
//! configuration:
//!
//! ```rust
//! use std::time::Duration;
//! use confkit::{DecoderFactory, Options};
//!
//! let tree = DecoderFactory::default()
//!     .decode("json", &br#"{"engine": {"format": "yaml", "poll_interval": "5s"}}"#[..])?;
//! let options: Options = tree.extract("engine")?;
//!
//! assert_eq!(options.format, "yaml");
//! assert_eq!(options.separator, '.');
//! assert_eq!(options.poll_interval, Duration::from_secs(5));
//! # Ok::<(), confkit::Error>(())
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::DEFAULT_SEPARATOR;

/// Default decode format for file, directory and REST suppliers.
pub const DEFAULT_FORMAT: &str = "json";

/// Engine-wide defaults.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Options {
    /// Format used when a supplier description omits `format`.
    pub format: String,

    /// Character splitting path strings into segments.
    pub separator: char,

    /// Hot-reload polling interval; zero disables polling.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            separator: DEFAULT_SEPARATOR,
            poll_interval: Duration::ZERO,
        }
    }
}

impl Options {
    /// Sets the default decode format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the path separator.
    #[must_use]
    pub const fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Sets the polling interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns `true` when hot reload polling is enabled.
    #[must_use]
    pub const fn polls(&self) -> bool {
        !self.poll_interval.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.format, "json");
        assert_eq!(options.separator, '.');
        assert!(!options.polls());
    }

    #[test]
    fn test_builder() {
        let options = Options::default()
            .with_format("yaml")
            .with_separator('/')
            .with_poll_interval(Duration::from_millis(250));
        assert_eq!(options.format, "yaml");
        assert_eq!(options.separator, '/');
        assert!(options.polls());
    }

    #[test]
    fn test_deserialize_partial_fields() {
        let options: Options = serde_json::from_str(r#"{"poll_interval": "1m 30s"}"#).unwrap();
        assert_eq!(options.poll_interval, Duration::from_secs(90));
        assert_eq!(options.format, "json");
    }
}
