//! Value types exchanged with a scene graph service

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Opaque reference to a live node, issued by a scene graph service
///
/// A handle is only meaningful to the service that issued it and goes stale
/// once the node is deleted. Always check liveness with
/// [`SceneGraph::identity`](crate::SceneGraph::identity) before trusting one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u64);

impl NodeHandle {
    /// Wrap a raw service token
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw service token
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Display for NodeHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}

/// Persistent node identity
///
/// Issued once when the node is created and kept across renames and
/// save/load cycles. A deleted and recreated node gets a new identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing identity string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identity
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string().to_uppercase())
    }

    /// Identity as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encoding of an exported scene file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Human-readable text
    #[default]
    PortableAscii,

    /// Compact encoding
    PortableBinary,
}

/// Options for [`SceneGraph::export_selected`](crate::SceneGraph::export_selected)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Keep references to nodes outside the exported set
    pub preserve_references: bool,
    /// File encoding
    pub format: ExportFormat,
    /// Export the descendants of selected nodes too
    pub include_descendants: bool,
}

impl ExportOptions {
    /// Default export options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With reference preservation toggled
    #[inline]
    #[must_use]
    pub fn with_preserve_references(mut self, preserve: bool) -> Self {
        self.preserve_references = preserve;
        self
    }

    /// With file format
    #[inline]
    #[must_use]
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// With descendant export toggled
    #[inline]
    #[must_use]
    pub fn with_descendants(mut self, include: bool) -> Self {
        self.include_descendants = include;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            preserve_references: true,
            format: ExportFormat::PortableAscii,
            include_descendants: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_raw_round_trip() {
        let handle = NodeHandle::from_raw(42);
        assert_eq!(handle.raw(), 42);
        assert_eq!(handle.to_string(), "#000000000000002a");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn node_id_serializes_as_plain_string() {
        let id = NodeId::new("ABC");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ABC\"");
    }

    #[test]
    fn export_defaults() {
        let options = ExportOptions::default();
        assert!(options.preserve_references);
        assert_eq!(options.format, ExportFormat::PortableAscii);
        assert!(options.include_descendants);
    }

    #[test]
    fn export_options_builder() {
        let options = ExportOptions::new()
            .with_preserve_references(false)
            .with_format(ExportFormat::PortableBinary)
            .with_descendants(false);
        assert!(!options.preserve_references);
        assert_eq!(options.format, ExportFormat::PortableBinary);
        assert!(!options.include_descendants);
    }

    #[test]
    fn export_options_partial_deserialize() {
        let options: ExportOptions =
            serde_json::from_str(r#"{"format": "portable_binary"}"#).unwrap();
        assert!(options.preserve_references);
        assert_eq!(options.format, ExportFormat::PortableBinary);
    }
}
