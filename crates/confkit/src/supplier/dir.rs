use std::fs::File;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};
use walkdir::WalkDir;

use super::factory::{has_type, optional_bool, optional_str, required_str};
use super::{Supplier, SupplierCreator, read_tree, tree_has};
use crate::{DecoderFactory, Partial, Path, Result, Value};

/// Decodes every regular file in a directory and merges the results.
///
/// Files are merged in directory-listing order, later files winning on
/// conflicting keys. That order is platform-dependent; do not rely on it to
/// break ties.
#[derive(Clone, Debug)]
pub struct DirSupplier {
    path: PathBuf,
    tree: Partial,
}

impl DirSupplier {
    /// Walks `path` (descending into subdirectories when `recursive`) and
    /// decodes each regular file as `format`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the directory cannot be
    /// listed or a file cannot be opened, or the first decode failure.
    pub fn new(
        path: impl Into<PathBuf>,
        format: &str,
        recursive: bool,
        decoders: &DecoderFactory,
    ) -> Result<Self> {
        let path = path.into();
        let mut walker = WalkDir::new(&path).min_depth(1).follow_links(true);
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut tree = Partial::new();
        let mut files = 0usize;

        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            trace!(file = %entry.path().display(), "decoding directory entry");
            let file = File::open(entry.path())?;
            tree.merge(decoders.decode(format, file)?);
            files += 1;
        }

        debug!(path = %path.display(), files, recursive, "loaded directory supplier");
        Ok(Self { path, tree })
    }

    /// The backing directory.
    #[must_use]
    pub fn path(&self) -> &FsPath {
        &self.path
    }
}

impl Supplier for DirSupplier {
    fn has(&self, path: Path<'_>) -> bool {
        tree_has(&self.tree, path)
    }

    fn get(&self, path: Path<'_>) -> Result<Value> {
        read_tree(&self.tree, path)
    }
}

/// Creates [`DirSupplier`]s from `type: dir` descriptions.
///
/// Fields: `path` (required), `format` (defaults to the configured format),
/// `recursive` (defaults to `false`).
#[derive(Clone, Debug)]
pub struct DirCreator {
    decoders: Arc<DecoderFactory>,
    format: String,
}

impl DirCreator {
    /// Creates a creator decoding with `decoders`, `format` by default.
    pub fn new(decoders: Arc<DecoderFactory>, format: impl Into<String>) -> Self {
        Self {
            decoders,
            format: format.into(),
        }
    }
}

impl SupplierCreator for DirCreator {
    fn accepts(&self, description: &Partial) -> bool {
        has_type(description, "dir")
    }

    fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>> {
        let path = required_str(description, "dir", "path")?;
        let format = optional_str(description, "format", &self.format)?;
        let recursive = optional_bool(description, "recursive", false)?;

        Ok(Box::new(DirSupplier::new(
            path,
            format,
            recursive,
            &self.decoders,
        )?))
    }
}
