//! Portable scene documents
//!
//! The file format written by [`MemoryScene`](crate::MemoryScene) exports and
//! saves. Identities travel with the nodes; handles do not.

use crate::error::SceneError;
use crate::types::{ExportFormat, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current document version
pub const DOCUMENT_VERSION: u32 = 1;

/// Serialized scene or scene fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Format version
    pub version: u32,
    /// Encoding the document was written with
    pub format: ExportFormat,
    /// Namespaces, parents before children
    pub namespaces: Vec<String>,
    /// Nodes, in creation order
    pub nodes: Vec<NodeEntry>,
}

/// One node of a [`SceneDocument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// Persistent identity
    pub id: NodeId,
    /// Host node type
    pub node_type: String,
    /// Namespace-qualified name
    pub name: String,
    /// Identity of the parent node, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    /// String attributes, in creation order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
}

impl SceneDocument {
    /// Empty document
    #[must_use]
    pub fn new(format: ExportFormat) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            format,
            namespaces: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Encode with the document's own format
    ///
    /// # Errors
    /// Returns error if encoding fails
    pub fn to_bytes(&self) -> Result<Vec<u8>, SceneError> {
        let bytes = match self.format {
            ExportFormat::PortableAscii => serde_json::to_vec_pretty(self)?,
            ExportFormat::PortableBinary => serde_json::to_vec(self)?,
        };
        Ok(bytes)
    }

    /// Decode either encoding
    ///
    /// # Errors
    /// Returns error if the bytes are not a document or the version is unknown
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SceneError> {
        let doc: Self = serde_json::from_slice(bytes)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(SceneError::InvalidDocument(format!(
                "unsupported version {}",
                doc.version
            )));
        }
        Ok(doc)
    }

    /// Write to `path`
    ///
    /// # Errors
    /// Returns error if encoding or writing fails
    pub fn write(&self, path: &Path) -> Result<(), SceneError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Read from `path`
    ///
    /// # Errors
    /// Returns error if reading or decoding fails
    pub fn read(path: &Path) -> Result<Self, SceneError> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    /// Find a node entry by name
    #[must_use]
    pub fn node_named(&self, name: &str) -> Option<&NodeEntry> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(format: ExportFormat) -> SceneDocument {
        let mut doc = SceneDocument::new(format);
        doc.namespaces.push("ns".into());
        let mut attributes = IndexMap::new();
        attributes.insert("system_type".to_string(), "System".to_string());
        doc.nodes.push(NodeEntry {
            id: NodeId::new("A"),
            node_type: "transform".into(),
            name: "ns:duck".into(),
            parent: None,
            attributes,
        });
        doc
    }

    #[test]
    fn ascii_is_pretty_binary_is_compact() {
        let ascii = sample(ExportFormat::PortableAscii).to_bytes().unwrap();
        let binary = sample(ExportFormat::PortableBinary).to_bytes().unwrap();
        assert!(ascii.contains(&b'\n'));
        assert!(!binary.contains(&b'\n'));
    }

    #[test]
    fn decodes_what_it_encodes() {
        let doc = sample(ExportFormat::PortableBinary);
        let decoded = SceneDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, doc);
        assert!(decoded.node_named("ns:duck").is_some());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut doc = sample(ExportFormat::PortableAscii);
        doc.version = 99;
        let bytes = serde_json::to_vec(&doc).unwrap();
        assert!(matches!(
            SceneDocument::from_bytes(&bytes),
            Err(SceneError::InvalidDocument(_))
        ));
    }
}
