use std::fs::{self, File};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use super::factory::{has_type, optional_str, required_str};
use super::{ObservableSupplier, Supplier, SupplierCreator, read_tree, tree_has};
use crate::{DecoderFactory, Partial, Path, Result, Value};

/// Opens and decodes one file.
fn load(path: &FsPath, format: &str, decoders: &DecoderFactory) -> Result<Partial> {
    let file = File::open(path)?;
    decoders.decode(format, file)
}

// ============================================================================
// File
// ============================================================================

/// Serves the decoded content of one file, read once at construction.
#[derive(Clone, Debug)]
pub struct FileSupplier {
    path: PathBuf,
    tree: Partial,
}

impl FileSupplier {
    /// Opens and decodes `path` as `format`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be opened,
    /// [`Error::InvalidFormat`](crate::Error::InvalidFormat) for an unknown
    /// format, or the decode failure.
    pub fn new(path: impl Into<PathBuf>, format: &str, decoders: &DecoderFactory) -> Result<Self> {
        let path = path.into();
        let tree = load(&path, format, decoders)?;
        debug!(path = %path.display(), format, "loaded file supplier");

        Ok(Self { path, tree })
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &FsPath {
        &self.path
    }
}

impl Supplier for FileSupplier {
    fn has(&self, path: Path<'_>) -> bool {
        tree_has(&self.tree, path)
    }

    fn get(&self, path: Path<'_>) -> Result<Value> {
        read_tree(&self.tree, path)
    }
}

// ============================================================================
// Observable file
// ============================================================================

/// A file supplier that reloads when the file's modification time advances.
///
/// The recorded modification time starts at the Unix epoch, so the first
/// [`reload`](ObservableSupplier::reload) always reloads.
pub struct ObservableFileSupplier {
    path: PathBuf,
    format: String,
    decoders: Arc<DecoderFactory>,
    tree: Partial,
    modified: SystemTime,
}

impl ObservableFileSupplier {
    /// Opens and decodes `path` as `format`.
    ///
    /// # Errors
    ///
    /// Fails like [`FileSupplier::new`].
    pub fn new(
        path: impl Into<PathBuf>,
        format: impl Into<String>,
        decoders: Arc<DecoderFactory>,
    ) -> Result<Self> {
        let path = path.into();
        let format = format.into();
        let tree = load(&path, &format, &decoders)?;
        debug!(path = %path.display(), format = %format, "loaded observable file supplier");

        Ok(Self {
            path,
            format,
            decoders,
            tree,
            modified: SystemTime::UNIX_EPOCH,
        })
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &FsPath {
        &self.path
    }
}

impl Supplier for ObservableFileSupplier {
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

impl ObservableSupplier for ObservableFileSupplier {
    fn reload(&mut self) -> Result<bool> {
        let modified = fs::metadata(&self.path)?.modified()?;
        if modified <= self.modified {
            return Ok(false);
        }

        self.tree = load(&self.path, &self.format, &self.decoders)?;
        self.modified = modified;
        debug!(path = %self.path.display(), "reloaded file");

        Ok(true)
    }
}

// ============================================================================
// Creators
// ============================================================================

/// Creates [`FileSupplier`]s from `type: file` descriptions.
///
/// Fields: `path` (required), `format` (defaults to the configured format).
#[derive(Clone, Debug)]
pub struct FileCreator {
    decoders: Arc<DecoderFactory>,
    format: String,
}

impl FileCreator {
    /// Creates a creator decoding with `decoders`, `format` by default.
    pub fn new(decoders: Arc<DecoderFactory>, format: impl Into<String>) -> Self {
        Self {
            decoders,
            format: format.into(),
        }
    }
}

impl SupplierCreator for FileCreator {
    fn accepts(&self, description: &Partial) -> bool {
        has_type(description, "file")
    }

    fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>> {
        let path = required_str(description, "file", "path")?;
        let format = optional_str(description, "format", &self.format)?;

        Ok(Box::new(FileSupplier::new(path, format, &self.decoders)?))
    }
}

/// Creates [`ObservableFileSupplier`]s from `type: observable-file`
/// descriptions.
///
/// Fields: `path` (required), `format` (defaults to the configured format).
#[derive(Clone, Debug)]
pub struct ObservableFileCreator {
    decoders: Arc<DecoderFactory>,
    format: String,
}

impl ObservableFileCreator {
    /// Creates a creator decoding with `decoders`, `format` by default.
    pub fn new(decoders: Arc<DecoderFactory>, format: impl Into<String>) -> Self {
        Self {
            decoders,
            format: format.into(),
        }
    }
}

impl SupplierCreator for ObservableFileCreator {
    fn accepts(&self, description: &Partial) -> bool {
        has_type(description, "observable-file")
    }

    fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>> {
        let path = required_str(description, "observable-file", "path")?;
        let format = optional_str(description, "format", &self.format)?;

        Ok(Box::new(ObservableFileSupplier::new(
            path,
            format,
            Arc::clone(&self.decoders),
        )?))
    }
}
