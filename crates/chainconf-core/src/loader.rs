//! Loading configuration documents
//!
//! The [`Loader`] turns a document reference into a [`KeyStore`]: it locates
//! and canonicalizes the document, seeds the parent chain, parses it with the
//! configured [`TreeReader`], and hands the root to the [`Resolver`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::reader::{strip_bom, TreeReader, XmlReader};
use crate::resolver::{
    canonical_path, has_extension, with_extension, Inheritance, Resolver, Visited,
};
use crate::store::KeyStore;

/// Standard suffix of configuration documents
pub const DEFAULT_EXTENSION: &str = ".config";

/// Options controlling how document references are located
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Suffix appended to references that lack it (including the leading dot)
    pub extension: String,
    /// Directory searched for bare document names (references without the suffix)
    pub search_dir: Option<PathBuf>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            search_dir: None,
        }
    }
}

impl LoaderOptions {
    /// Set the directory searched for bare document names
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// Set the standard document suffix
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Entry point for resolving configuration documents
#[derive(Clone)]
pub struct Loader {
    reader: Arc<dyn TreeReader>,
    options: LoaderOptions,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("reader", &self.reader.name())
            .field("options", &self.options)
            .finish()
    }
}

impl Loader {
    /// Create a loader for XML documents with default options
    pub fn new() -> Self {
        Self::with_options(LoaderOptions::default())
    }

    /// Create an XML loader with custom options
    pub fn with_options(options: LoaderOptions) -> Self {
        Self {
            reader: Arc::new(XmlReader::new()),
            options,
        }
    }

    /// Replace the tree reader used for every document in a chain
    pub fn with_reader(mut self, reader: Arc<dyn TreeReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Compute the canonical path a document reference refers to
    ///
    /// References without the standard suffix get it appended, and are looked
    /// up in [`LoaderOptions::search_dir`] when one is configured.
    pub fn document_path(&self, reference: impl AsRef<Path>) -> Result<PathBuf> {
        let reference = reference.as_ref();
        let extension = &self.options.extension;

        let path = if has_extension(reference, extension) {
            reference.to_path_buf()
        } else {
            let named = with_extension(reference.to_path_buf(), extension);
            match &self.options.search_dir {
                Some(dir) => dir.join(named),
                None => named,
            }
        };
        canonical_path(&path)
    }

    /// Load a document and its parent chain into a [`KeyStore`]
    pub fn load(&self, reference: impl AsRef<Path>) -> Result<KeyStore> {
        let path = self.document_path(reference)?;
        debug!("loading configuration from {}", path.display());

        let visited = Visited::new(path);
        let resolver = self.resolver();
        let root = resolver.read_document(visited.root())?;
        let resolution = resolver.resolve(&root, Inheritance::Allowed(&visited))?;

        debug!(
            "resolved {} keys from {}",
            resolution.values().len(),
            visited.root().display()
        );
        Ok(resolution.into())
    }

    /// Resolve in-memory document text as if it had been read from `origin`
    ///
    /// `origin` anchors parent references and is recorded as the source of
    /// the document's own keys; it does not need to exist.
    pub fn load_str(&self, text: &str, origin: impl AsRef<Path>) -> Result<KeyStore> {
        let path = self.document_path(origin)?;
        let root = self
            .reader
            .read(strip_bom(text))
            .map_err(|e| e.in_document(&path))?;

        let visited = Visited::new(path);
        let resolution = self
            .resolver()
            .resolve(&root, Inheritance::Allowed(&visited))?;
        Ok(resolution.into())
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.reader.as_ref(), &self.options.extension)
    }
}

/// Load a document with default options
///
/// ```no_run
/// let store = chainconf_core::load("res/Config/episode.config")?;
/// let logo = store.get(&["logo"])?;
/// # Ok::<(), chainconf_core::Error>(())
/// ```
pub fn load(reference: impl AsRef<Path>) -> Result<KeyStore> {
    Loader::new().load(reference)
}
