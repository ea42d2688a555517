//! Document tree nodes
//!
//! A [`ConfigNode`] is the format-neutral shape every [`TreeReader`](crate::reader::TreeReader)
//! produces: an element name, ordered attributes, ordered child elements, and
//! optional inline text.

use indexmap::IndexMap;

/// Root element name of every configuration document
pub const CONFIGURATION_TAG: &str = "configuration";
/// Element name of an entry inside a configuration
pub const ADD_TAG: &str = "add";

/// Attribute naming the parent document on a configuration root
pub const PARENT_ATTR: &str = "parent";
/// Attribute naming an entry's key
pub const KEY_ATTR: &str = "key";
/// Attribute carrying an entry's value
pub const VALUE_ATTR: &str = "value";
/// Attribute flagging an entry as a nested configuration
pub const NESTED_ATTR: &str = "nested";

/// An element of a parsed configuration document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigNode {
    /// Element name (e.g., "configuration" or "add")
    pub name: String,
    /// Attributes in document order
    pub attributes: IndexMap<String, String>,
    /// Child elements in document order
    pub children: Vec<ConfigNode>,
    /// Concatenated inline text, if any
    pub text: Option<String>,
}

impl ConfigNode {
    /// Create an element with no attributes, children or text
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child element
    pub fn with_child(mut self, child: ConfigNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set the inline text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Check the element name
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Inline text, if present and not entirely whitespace
    pub fn non_blank_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}
