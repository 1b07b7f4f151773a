//! Error types for scene graph services

use crate::name::PathError;
use crate::types::NodeHandle;

/// Failure reported by a scene graph service
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// No node matches the given name or identity
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Handle does not refer to a live node
    #[error("invalid node handle {0}")]
    InvalidHandle(NodeHandle),

    /// Name failed validation
    #[error("invalid name: {0}")]
    InvalidName(#[from] PathError),

    /// Operation not permitted on this namespace
    #[error("invalid namespace operation on '{namespace}': {reason}")]
    InvalidNamespace {
        /// Namespace the operation targeted
        namespace: String,
        /// Why it was refused
        reason: &'static str,
    },

    /// Namespace does not exist
    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    /// Namespace already exists
    #[error("namespace already exists: {0}")]
    NamespaceExists(String),

    /// Namespace still holds nodes or namespaces
    #[error("namespace is not empty: {0}")]
    NamespaceNotEmpty(String),

    /// Attribute missing on node
    #[error("attribute '{attribute}' not found on {node}")]
    AttributeNotFound {
        /// Node name
        node: String,
        /// Attribute name
        attribute: String,
    },

    /// Attribute already present on node
    #[error("attribute '{attribute}' already exists on {node}")]
    AttributeExists {
        /// Node name
        node: String,
        /// Attribute name
        attribute: String,
    },

    /// Export requested with an empty selection
    #[error("nothing selected to export")]
    NothingSelected,

    /// Scene document is inconsistent
    #[error("invalid scene document: {0}")]
    InvalidDocument(String),

    /// File system failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SceneError {
    /// Check if the error means the node is gone
    #[inline]
    #[must_use]
    pub fn is_missing_node(&self) -> bool {
        matches!(self, Self::NodeNotFound(_) | Self::InvalidHandle(_))
    }
}
