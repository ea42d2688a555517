//! Tree readers
//!
//! The resolver never looks at document text directly. A [`TreeReader`]
//! turns text into a [`ConfigNode`] tree, so any document format can back
//! the resolution engine. [`XmlReader`] is the built-in implementation.

use crate::error::{Error, Result};
use crate::node::ConfigNode;

/// Byte-order mark that some editors prepend to UTF-8 documents
const BOM: char = '\u{feff}';

/// Parses document text into a node tree
pub trait TreeReader: Send + Sync {
    /// Parse `text` and return its root element
    fn read(&self, text: &str) -> Result<ConfigNode>;

    /// Get the name of this reader (used in log messages)
    fn name(&self) -> &str;
}

/// Remove leading byte-order marks left over from the document's encoding
pub fn strip_bom(text: &str) -> &str {
    text.trim_start_matches(BOM)
}

/// Built-in XML reader
///
/// Element and attribute names are taken without namespace prefixes.
/// An element's inline text is the concatenation of every text node below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlReader;

impl XmlReader {
    pub fn new() -> Self {
        Self
    }
}

impl TreeReader for XmlReader {
    fn read(&self, text: &str) -> Result<ConfigNode> {
        let doc = roxmltree::Document::parse(strip_bom(text))
            .map_err(|e| Error::parse(e.to_string()))?;
        Ok(convert(doc.root_element()))
    }

    fn name(&self) -> &str {
        "xml"
    }
}

fn convert(element: roxmltree::Node<'_, '_>) -> ConfigNode {
    let mut node = ConfigNode::new(element.tag_name().name());

    for attr in element.attributes() {
        node.attributes
            .insert(attr.name().to_string(), attr.value().to_string());
    }

    node.children = element
        .children()
        .filter(|child| child.is_element())
        .map(convert)
        .collect();

    let text: String = element
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    if !text.is_empty() {
        node.text = Some(text);
    }

    node
}
