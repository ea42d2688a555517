//! Error types for chainconf
//!
//! Every failure while loading a document chain or reading the resolved
//! store is reported through a single [`Error`] carrying an [`ErrorKind`]
//! tag, the key and document involved (when known), and an actionable
//! help message.

use std::fmt;
use std::path::{Path, PathBuf};

/// Result type alias for chainconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for chainconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Configuration key involved (e.g., "padding/horizontal")
    pub key: Option<String>,
    /// Document being resolved when the error occurred
    pub document: Option<PathBuf>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong root or entry tag, missing key or value, malformed nesting
    MalformedDocument,
    /// An entry declares both a value and a nested block
    ConflictingDefinition,
    /// The same key was defined twice in one document or nested block
    DuplicateKey,
    /// A parent chain revisits a document
    CircularReference,
    /// A required lookup missed
    KeyNotFound,
    /// The tree reader rejected the document text
    Parse,
    /// The document could not be read
    Io,
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            document: None,
            help: None,
            cause: None,
        }
    }

    /// Create a malformed document error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::MalformedDocument)
        }
    }

    /// Create a conflicting definition error for an entry with both `value` and `nested`
    pub fn conflicting_definition(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            help: Some("Remove either the \"value\" attribute or nested=\"true\"".into()),
            ..Self::new(ErrorKind::ConflictingDefinition)
        }
    }

    /// Create a duplicate key error
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            help: Some(
                "A key may only be defined once per document; redefine it in a child document to override it"
                    .into(),
            ),
            ..Self::new(ErrorKind::DuplicateKey)
        }
    }

    /// Create a circular reference error
    pub fn circular_reference(chain: &[PathBuf]) -> Self {
        let chain_str = chain
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" → ");
        Self {
            help: Some("Break the cycle by removing one of the \"parent\" attributes".into()),
            cause: Some(format!("Chain: {}", chain_str)),
            ..Self::new(ErrorKind::CircularReference)
        }
    }

    /// Create a key not found error
    pub fn key_not_found(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            help: Some(format!("Check that '{}' exists in the configuration", key)),
            key: Some(key),
            ..Self::new(ErrorKind::KeyNotFound)
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Parse)
        }
    }

    /// Create an I/O error for a document that could not be read
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        let mut error = Self {
            cause: Some(err.to_string()),
            document: Some(path.to_path_buf()),
            ..Self::new(ErrorKind::Io)
        };
        if err.kind() == std::io::ErrorKind::NotFound {
            error.help = Some("Parent references are resolved relative to the top-level document".into());
        }
        error
    }

    /// Add key context to the error
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add document context to the error, keeping the innermost document if one is already set
    pub fn in_document(mut self, path: &Path) -> Self {
        if self.document.is_none() {
            self.document = Some(path.to_path_buf());
        }
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::MalformedDocument => write!(f, "Malformed document")?,
            ErrorKind::ConflictingDefinition => write!(f, "Conflicting definition")?,
            ErrorKind::DuplicateKey => write!(f, "Duplicate key")?,
            ErrorKind::CircularReference => write!(f, "Circular reference detected")?,
            ErrorKind::KeyNotFound => write!(f, "Key not found")?,
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::Io => write!(f, "I/O error")?,
        }

        if let Some(key) = &self.key {
            write!(f, "\n  Key: {}", key)?;
        }

        if let Some(document) = &self.document {
            write!(f, "\n  File: {}", document.display())?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_reference_error_display() {
        let err = Error::circular_reference(&[
            PathBuf::from("/cfg/a.config"),
            PathBuf::from("/cfg/b.config"),
            PathBuf::from("/cfg/a.config"),
        ]);
        let display = format!("{}", err);

        assert!(display.contains("Circular reference detected"));
        assert!(display.contains("/cfg/a.config → /cfg/b.config → /cfg/a.config"));
        assert!(display.contains("Help:"));
    }

    #[test]
    fn test_key_not_found_error() {
        let err = Error::key_not_found("padding/vertical");

        assert_eq!(err.kind, ErrorKind::KeyNotFound);
        assert_eq!(err.key, Some("padding/vertical".into()));
        assert!(err.to_string().contains("Key: padding/vertical"));
    }

    #[test]
    fn test_duplicate_key_error_display() {
        let err = Error::duplicate_key("logo").in_document(Path::new("/cfg/show.config"));
        let display = format!("{}", err);

        assert!(display.contains("Duplicate key"));
        assert!(display.contains("Key: logo"));
        assert!(display.contains("File: /cfg/show.config"));
    }

    #[test]
    fn test_in_document_keeps_innermost() {
        let err = Error::malformed("missing key")
            .in_document(Path::new("/cfg/base.config"))
            .in_document(Path::new("/cfg/child.config"));

        assert_eq!(err.document, Some(PathBuf::from("/cfg/base.config")));
    }

    #[test]
    fn test_malformed_error_display() {
        let err = Error::malformed("All entries must be \"add\" tags").with_key("title");
        let display = format!("{}", err);

        assert!(display.contains("Malformed document"));
        assert!(display.contains("Key: title"));
        assert!(display.contains("All entries must be \"add\" tags"));
    }

    #[test]
    fn test_io_not_found_has_help() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::io(Path::new("/cfg/missing.config"), &io);

        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.help.is_some());
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_with_help() {
        let err = Error::parse("unexpected end of stream").with_help("Close every element");
        let display = format!("{}", err);

        assert!(display.contains("Parse error"));
        assert!(display.contains("Help: Close every element"));
    }
}
