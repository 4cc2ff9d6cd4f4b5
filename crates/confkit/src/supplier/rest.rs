use std::fmt::{self, Debug, Formatter};
use std::io::Cursor;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::factory::{has_type, optional_str, required_str};
use super::{ObservableSupplier, Supplier, SupplierCreator, read_tree, tree_has};
use crate::options::DEFAULT_FORMAT;
use crate::{DEFAULT_SEPARATOR, DecoderFactory, Error, Options, Partial, Path, Result, Value};

// ============================================================================
// HTTP capability
// ============================================================================

/// Blocking HTTP GET, injected into REST suppliers.
pub trait HttpClient: Send + Sync {
    /// Fetches `uri` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure or a non-success status.
    fn get(&self, uri: &str) -> Result<Vec<u8>>;
}

/// [`HttpClient`] backed by `reqwest`'s blocking client.
#[cfg(feature = "rest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "rest")]
impl ReqwestClient {
    /// Wraps a configured client.
    #[must_use]
    pub const fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "rest")]
impl HttpClient for ReqwestClient {
    fn get(&self, uri: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(uri)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::http_with_source(uri, "request failed", e))?;

        let body = response
            .bytes()
            .map_err(|e| Error::http_with_source(uri, "failed to read body", e))?;

        Ok(body.to_vec())
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// Where and how a REST supplier fetches its content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// URI requested with GET.
    pub uri: String,

    /// Decode format of the response body.
    pub format: String,

    /// Path inside the response holding the supplied subtree; empty for the
    /// whole response.
    pub config_path: String,

    /// Separator for `config_path` and timestamp paths.
    pub separator: char,
}

impl Endpoint {
    /// Creates an endpoint decoding JSON with the default separator.
    pub fn new(uri: impl Into<String>, config_path: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            format: DEFAULT_FORMAT.to_string(),
            config_path: config_path.into(),
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Sets the decode format.
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

    fn path<'a>(&self, raw: &'a str) -> Path<'a> {
        Path::with_separator(raw, self.separator)
    }

    /// GETs and decodes the whole response.
    fn fetch(&self, client: &dyn HttpClient, decoders: &DecoderFactory) -> Result<Partial> {
        let body = client.get(&self.uri)?;
        decoders.decode(&self.format, Cursor::new(body))
    }

    /// Extracts the configured subtree from a response.
    fn select(&self, response: &Partial) -> Result<Partial> {
        let path = self.path(&self.config_path);
        if path.is_root() {
            return Ok(response.clone());
        }

        response.partial(path).cloned()
    }

    /// Reads and parses an RFC 3339 timestamp from a response.
    fn timestamp(&self, response: &Partial, path: &str) -> Result<DateTime<Utc>> {
        let raw = response.string(self.path(path))?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|source| Error::Timestamp {
                value: raw.to_string(),
                source,
            })
    }
}

// ============================================================================
// REST
// ============================================================================

/// Serves a subtree of one REST response, fetched once at construction.
#[derive(Clone, Debug)]
pub struct RestSupplier {
    endpoint: Endpoint,
    tree: Partial,
}

impl RestSupplier {
    /// Fetches `endpoint` and extracts its configured subtree.
    ///
    /// # Errors
    ///
    /// Returns the HTTP failure, the decode failure, or a lookup error if the
    /// configured path is absent or not a tree.
    pub fn new(endpoint: Endpoint, client: &dyn HttpClient, decoders: &DecoderFactory) -> Result<Self> {
        let response = endpoint.fetch(client, decoders)?;
        let tree = endpoint.select(&response)?;
        debug!(uri = %endpoint.uri, "loaded rest supplier");

        Ok(Self { endpoint, tree })
    }

    /// The endpoint this supplier was loaded from.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Supplier for RestSupplier {
    fn has(&self, path: Path<'_>) -> bool {
        tree_has(&self.tree, path)
    }

    fn get(&self, path: Path<'_>) -> Result<Value> {
        read_tree(&self.tree, path)
    }
}

// ============================================================================
// Observable REST
// ============================================================================

/// A REST supplier that reloads when a timestamp in the response advances.
///
/// The recorded timestamp starts at the earliest representable instant, so
/// the first [`reload`](ObservableSupplier::reload) always reloads.
pub struct ObservableRestSupplier {
    endpoint: Endpoint,
    timestamp_path: String,
    client: Arc<dyn HttpClient>,
    decoders: Arc<DecoderFactory>,
    tree: Partial,
    timestamp: DateTime<Utc>,
}

impl ObservableRestSupplier {
    /// Fetches `endpoint`, extracting its subtree and validating the
    /// timestamp at `timestamp_path`.
    ///
    /// # Errors
    ///
    /// Fails like [`RestSupplier::new`], or with [`Error::Timestamp`] if the
    /// timestamp is not RFC 3339.
    pub fn new(
        endpoint: Endpoint,
        timestamp_path: impl Into<String>,
        client: Arc<dyn HttpClient>,
        decoders: Arc<DecoderFactory>,
    ) -> Result<Self> {
        let timestamp_path = timestamp_path.into();
        let response = endpoint.fetch(client.as_ref(), &decoders)?;
        endpoint.timestamp(&response, &timestamp_path)?;
        let tree = endpoint.select(&response)?;
        debug!(uri = %endpoint.uri, "loaded observable rest supplier");

        Ok(Self {
            endpoint,
            timestamp_path,
            client,
            decoders,
            tree,
            timestamp: DateTime::<Utc>::MIN_UTC,
        })
    }

    /// The endpoint this supplier polls.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Debug for ObservableRestSupplier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableRestSupplier")
            .field("endpoint", &self.endpoint)
            .field("timestamp_path", &self.timestamp_path)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

impl Supplier for ObservableRestSupplier {
    fn has(&self, path: Path<'_>) -> bool {
        tree_has(&self.tree, path)
    }

    fn get(&self, path: Path<'_>) -> Result<Value> {
        read_tree(&self.tree, path)
    }

    fn as_observable(&mut self) -> Option<&mut dyn ObservableSupplier> {
        Some(self)
    }
}

impl ObservableSupplier for ObservableRestSupplier {
    fn reload(&mut self) -> Result<bool> {
        let response = self.endpoint.fetch(self.client.as_ref(), &self.decoders)?;
        let timestamp = self.endpoint.timestamp(&response, &self.timestamp_path)?;
        if timestamp <= self.timestamp {
            return Ok(false);
        }

        self.tree = self.endpoint.select(&response)?;
        self.timestamp = timestamp;
        debug!(uri = %self.endpoint.uri, %timestamp, "reloaded rest supplier");

        Ok(true)
    }
}

// ============================================================================
// Creators
// ============================================================================

/// Creates [`RestSupplier`]s from `type: rest` descriptions.
///
/// Fields: `uri` and `path.config` (required), `format` (defaults to the
/// configured format).
pub struct RestCreator {
    client: Arc<dyn HttpClient>,
    decoders: Arc<DecoderFactory>,
    format: String,
    separator: char,
}

impl RestCreator {
    /// Creates a creator fetching through `client`.
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>, decoders: Arc<DecoderFactory>, options: &Options) -> Self {
        Self {
            client,
            decoders,
            format: options.format.clone(),
            separator: options.separator,
        }
    }
}

/// Parses the fields shared by both REST descriptions.
fn endpoint(
    description: &Partial,
    kind: &'static str,
    format: &str,
    separator: char,
) -> Result<Endpoint> {
    let uri = required_str(description, kind, "uri")?;
    let config = required_str(description, kind, "path.config")?;
    let format = optional_str(description, "format", format)?;

    Ok(Endpoint::new(uri, config)
        .with_format(format)
        .with_separator(separator))
}

impl SupplierCreator for RestCreator {
    fn accepts(&self, description: &Partial) -> bool {
        has_type(description, "rest")
    }

    fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>> {
        let endpoint = endpoint(description, "rest", &self.format, self.separator)?;

        Ok(Box::new(RestSupplier::new(
            endpoint,
            self.client.as_ref(),
            &self.decoders,
        )?))
    }
}

/// Creates [`ObservableRestSupplier`]s from `type: observable-rest`
/// descriptions.
///
/// Fields: `uri`, `path.config` and `path.timestamp` (required), `format`
/// (defaults to the configured format).
pub struct ObservableRestCreator {
    client: Arc<dyn HttpClient>,
    decoders: Arc<DecoderFactory>,
    format: String,
    separator: char,
}

impl ObservableRestCreator {
    /// Creates a creator fetching through `client`.
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>, decoders: Arc<DecoderFactory>, options: &Options) -> Self {
        Self {
            client,
            decoders,
            format: options.format.clone(),
            separator: options.separator,
        }
    }
}

impl SupplierCreator for ObservableRestCreator {
    fn accepts(&self, description: &Partial) -> bool {
        has_type(description, "observable-rest")
    }

    fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>> {
        let endpoint = endpoint(description, "observable-rest", &self.format, self.separator)?;
        let timestamp = required_str(description, "observable-rest", "path.timestamp")?;

        Ok(Box::new(ObservableRestSupplier::new(
            endpoint,
            timestamp,
            Arc::clone(&self.client),
            Arc::clone(&self.decoders),
        )?))
    }
}
