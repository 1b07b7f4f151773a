//! Error types for Sysnode Core
//!
//! Provides error handling for:
//! - Wrappers whose node was deleted out from under them
//! - Lookups that do not resolve
//! - Malformed serialized data
//! - Configuration loading

use sysnode_scene::{NodeId, SceneError};

/// Failure of a node or system operation
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The wrapped node no longer exists
    #[error("invalid node: {class}({id}) not found")]
    StaleReference {
        /// Class of the wrapper
        class: &'static str,
        /// Identity the wrapper was bound to
        id: NodeId,
    },

    /// Name, identity or handle did not resolve
    #[error("node not found: {0}")]
    NotFound(String),

    /// Serialized data cannot be rebuilt
    #[error("invalid serialized data: {0}")]
    InvalidData(String),

    /// Scene graph service failure
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

impl NodeError {
    /// Check if the error means the wrapper outlived its node
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleReference { .. })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is not valid TOML for this schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_reference_names_class_and_identity() {
        let err = NodeError::StaleReference {
            class: "System",
            id: NodeId::new("ABC"),
        };
        assert!(err.is_stale());
        assert_eq!(err.to_string(), "invalid node: System(ABC) not found");
    }

    #[test]
    fn scene_errors_are_not_stale() {
        let err: NodeError = SceneError::NothingSelected.into();
        assert!(!err.is_stale());
        assert!(matches!(err, NodeError::Scene(_)));
    }
}
