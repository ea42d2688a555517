//! Document chain resolution
//!
//! The resolver walks a configuration root, first pulling in its parent
//! chain (if inheritance is allowed) and then layering the document's own
//! `add` entries on top. Nested entries are resolved as independent
//! sub-configurations and flattened under their key as `key/subkey`.
//!
//! Two pieces of bookkeeping drive the rules:
//! - [`Visited`] holds every document entered along the current parent
//!   chain. Entering a document twice is a circular reference.
//! - A per-scope key set records keys freshly defined in the current
//!   document or nested block. Redefining an inherited key is an override;
//!   redefining a key from the same scope is a duplicate.

use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::node::{
    ConfigNode, ADD_TAG, CONFIGURATION_TAG, KEY_ATTR, NESTED_ATTR, PARENT_ATTR, VALUE_ATTR,
};
use crate::reader::{strip_bom, TreeReader};
use crate::store::KEY_SEPARATOR;

/// Documents entered along the current parent chain, top-level document first
///
/// Extending the chain returns a new value, so every recursive call owns an
/// unambiguous view of what it has already entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visited {
    chain: Vec<PathBuf>,
}

impl Visited {
    /// Start a chain at the top-level document
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            chain: vec![document.into()],
        }
    }

    /// The top-level document; parent references are resolved against its directory
    pub fn root(&self) -> &Path {
        &self.chain[0]
    }

    /// The document most recently entered
    pub fn current(&self) -> &Path {
        &self.chain[self.chain.len() - 1]
    }

    /// Check whether a document has already been entered
    pub fn contains(&self, document: &Path) -> bool {
        self.chain.iter().any(|p| p == document)
    }

    /// Return a copy of this chain extended with `document`
    pub fn with(&self, document: impl Into<PathBuf>) -> Self {
        let mut chain = self.chain.clone();
        chain.push(document.into());
        Self { chain }
    }

    /// Every document in the chain, in the order entered
    ///
    /// Never empty: the chain always starts at the top-level document.
    pub fn chain(&self) -> &[PathBuf] {
        &self.chain
    }
}

/// Whether a configuration root may pull in a parent document
#[derive(Debug, Clone, Copy)]
pub enum Inheritance<'a> {
    /// The root is at the top of a load chain; `parent` is honored
    Allowed(&'a Visited),
    /// The root is a nested block; `parent` is ignored
    Disabled,
}

/// Flat key/value mapping produced by resolving a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    values: BTreeMap<String, String>,
    sources: BTreeMap<String, PathBuf>,
}

impl Resolution {
    /// Resolved values, sorted by key
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Document that supplied each value (keys from in-memory roots have no entry)
    pub fn sources(&self) -> &BTreeMap<String, PathBuf> {
        &self.sources
    }

    pub fn into_parts(self) -> (BTreeMap<String, String>, BTreeMap<String, PathBuf>) {
        (self.values, self.sources)
    }

    /// Merge one freshly defined key into the mapping
    fn define(
        &mut self,
        key: String,
        value: String,
        origin: Option<&Path>,
        scope: &mut HashSet<String>,
    ) -> Result<()> {
        if self.values.contains_key(&key) {
            if scope.contains(&key) {
                return Err(Error::duplicate_key(key));
            }
            trace!("overriding inherited key '{}'", key);
        }

        match origin {
            Some(path) => {
                self.sources.insert(key.clone(), path.to_path_buf());
            }
            None => {
                self.sources.remove(&key);
            }
        }
        scope.insert(key.clone());
        self.values.insert(key, value);
        Ok(())
    }
}

/// Resolves configuration roots into flat mappings
pub struct Resolver<'a> {
    reader: &'a dyn TreeReader,
    extension: &'a str,
}

impl<'a> Resolver<'a> {
    /// Create a resolver that parses parent documents with `reader` and
    /// appends `extension` to parent references that lack it
    pub fn new(reader: &'a dyn TreeReader, extension: &'a str) -> Self {
        Self { reader, extension }
    }

    /// Resolve a configuration root
    ///
    /// With [`Inheritance::Allowed`], the root's `parent` attribute (if any)
    /// is followed and the current document of `visited` is recorded as the
    /// source of every key this root defines.
    pub fn resolve(&self, node: &ConfigNode, inheritance: Inheritance<'_>) -> Result<Resolution> {
        let origin = match inheritance {
            Inheritance::Allowed(visited) => Some(visited.current()),
            Inheritance::Disabled => None,
        };
        self.resolve_scope(node, inheritance, origin)
            .map_err(|e| match origin {
                Some(path) => e.in_document(path),
                None => e,
            })
    }

    /// Read and parse a document through the configured tree reader
    pub fn read_document(&self, path: &Path) -> Result<ConfigNode> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, &e))?;
        debug!(
            "parsing {} with {} reader ({} bytes)",
            path.display(),
            self.reader.name(),
            text.len()
        );
        self.reader
            .read(strip_bom(&text))
            .map_err(|e| e.in_document(path))
    }

    fn resolve_scope(
        &self,
        node: &ConfigNode,
        inheritance: Inheritance<'_>,
        origin: Option<&Path>,
    ) -> Result<Resolution> {
        if !node.is(CONFIGURATION_TAG) {
            return Err(Error::malformed(format!(
                "Config must be encapsulated by a \"{}\" tag, found \"{}\"",
                CONFIGURATION_TAG, node.name
            )));
        }

        let mut resolution = match (inheritance, node.attr(PARENT_ATTR)) {
            (Inheritance::Allowed(visited), Some(parent)) => self.resolve_parent(parent, visited)?,
            _ => Resolution::default(),
        };

        let mut scope = HashSet::new();
        for entry in &node.children {
            self.resolve_entry(entry, origin, &mut resolution, &mut scope)?;
        }

        Ok(resolution)
    }

    fn resolve_parent(&self, reference: &str, visited: &Visited) -> Result<Resolution> {
        let path = parent_path(visited.root(), reference, self.extension)?;

        if visited.contains(&path) {
            let mut chain = visited.chain().to_vec();
            chain.push(path);
            return Err(Error::circular_reference(&chain));
        }

        debug!(
            "entering parent document {} (chain depth {})",
            path.display(),
            visited.chain().len()
        );
        let visited = visited.with(path);
        let node = self.read_document(visited.current())?;
        self.resolve(&node, Inheritance::Allowed(&visited))
    }

    fn resolve_entry(
        &self,
        entry: &ConfigNode,
        origin: Option<&Path>,
        resolution: &mut Resolution,
        scope: &mut HashSet<String>,
    ) -> Result<()> {
        if !entry.is(ADD_TAG) {
            return Err(Error::malformed(format!(
                "All entries must be \"{}\" tags, found \"{}\"",
                ADD_TAG, entry.name
            )));
        }

        let key = entry.attr(KEY_ATTR).ok_or_else(|| {
            Error::malformed(format!("Entry is missing the \"{}\" attribute", KEY_ATTR))
        })?;
        let nested = nested_flag(entry);

        match (entry.attr(VALUE_ATTR), nested) {
            (Some(_), true) => Err(Error::conflicting_definition(key)),
            (Some(value), false) => {
                resolution.define(key.to_string(), value.to_string(), origin, scope)
            }
            (None, true) => {
                let child = match entry.children.as_slice() {
                    [child] => child,
                    children => {
                        return Err(Error::malformed(format!(
                            "Must supply exactly one child configuration when {}=\"true\" is specified, found {}",
                            NESTED_ATTR,
                            children.len()
                        ))
                        .with_key(key))
                    }
                };

                let sub = self
                    .resolve_scope(child, Inheritance::Disabled, origin)
                    .map_err(|e| match e.key.clone() {
                        Some(inner) => e.with_key(format!("{}{}{}", key, KEY_SEPARATOR, inner)),
                        None => e.with_key(key),
                    })?;
                for (sub_key, value) in sub.values {
                    let qualified = format!("{}{}{}", key, KEY_SEPARATOR, sub_key);
                    resolution.define(qualified, value, origin, scope)?;
                }
                Ok(())
            }
            (None, false) => match entry.non_blank_text() {
                Some(text) => resolution.define(key.to_string(), text.to_string(), origin, scope),
                None => Err(Error::malformed(format!(
                    "Entry must have a \"{}\" attribute, inline text, or {}=\"true\"",
                    VALUE_ATTR, NESTED_ATTR
                ))
                .with_key(key)),
            },
        }
    }
}

/// Only an exact, lowercase `nested="true"` marks a nested entry
fn nested_flag(entry: &ConfigNode) -> bool {
    entry.attr(NESTED_ATTR) == Some("true")
}

/// Check whether `path` already ends with `extension` (ASCII case-insensitive)
pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.to_string_lossy()
        .to_lowercase()
        .ends_with(&extension.to_lowercase())
}

/// Append `extension` unless the path already carries it
pub(crate) fn with_extension(path: PathBuf, extension: &str) -> PathBuf {
    if has_extension(&path, extension) {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(extension);
    PathBuf::from(raw)
}

/// Make `path` absolute and remove `.` and `..` components without touching the filesystem
pub(crate) fn canonical_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::io(path, &e))?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Locate a parent document relative to the top-level document's directory
fn parent_path(root: &Path, reference: &str, extension: &str) -> Result<PathBuf> {
    let reference = with_extension(
        PathBuf::from(reference.replace('/', MAIN_SEPARATOR_STR)),
        extension,
    );
    let base = root.parent().unwrap_or_else(|| Path::new(""));
    canonical_path(&base.join(reference))
}
