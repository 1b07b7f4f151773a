//! The scene graph service interface
//!
//! [`SceneGraph`] is the whole surface the object model needs from a host
//! document: lookup, node lifecycle, naming, namespaces, string attributes,
//! selection and export. Every call is blocking and its effect is visible to
//! other users of the graph as soon as it returns.

use crate::error::SceneError;
use crate::types::{ExportOptions, NodeHandle, NodeId};
use std::path::Path;

/// External scene graph service
///
/// Namespaces are addressed by their full path without a leading separator;
/// the root namespace is the empty string.
pub trait SceneGraph {
    /// Resolve a node name or identity to a live handle
    fn resolve(&self, name_or_id: &str) -> Option<NodeHandle>;

    /// Identity of the node behind `node`, `None` if the handle is stale
    fn identity(&self, node: NodeHandle) -> Option<NodeId>;

    /// Liveness check
    fn is_alive(&self, node: NodeHandle) -> bool {
        self.identity(node).is_some()
    }

    /// Host type of the node (e.g. `transform`)
    ///
    /// # Errors
    /// Returns error if the handle is stale
    fn node_type(&self, node: NodeHandle) -> Result<String, SceneError>;

    /// Parent of the node, `None` for nodes under the document root
    ///
    /// # Errors
    /// Returns error if the handle is stale
    fn parent(&self, node: NodeHandle) -> Result<Option<NodeHandle>, SceneError>;

    /// Create a node of `node_type`
    ///
    /// Without a name, the service picks one from the node type. Clashing
    /// names are resolved by the service.
    ///
    /// # Errors
    /// Returns error if the name is invalid, its namespace is missing or the
    /// parent is stale
    fn create_node(
        &mut self,
        node_type: &str,
        name: Option<&str>,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, SceneError>;

    /// Delete a node and its descendants
    ///
    /// # Errors
    /// Returns error if the handle is stale
    fn delete_node(&mut self, node: NodeHandle) -> Result<(), SceneError>;

    /// Rename a node, returning the name actually given
    ///
    /// # Errors
    /// Returns error if the handle is stale, the name is invalid or its
    /// namespace is missing
    fn rename_node(&mut self, node: NodeHandle, new_name: &str) -> Result<String, SceneError>;

    /// Current namespace-qualified name
    ///
    /// # Errors
    /// Returns error if the handle is stale
    fn get_name(&self, node: NodeHandle) -> Result<String, SceneError>;

    /// Namespace part of the current name, empty when at root
    ///
    /// # Errors
    /// Returns error if the handle is stale
    fn get_namespace(&self, node: NodeHandle) -> Result<String, SceneError>;

    /// Check if a namespace exists (the root always does)
    fn namespace_exists(&self, namespace: &str) -> bool;

    /// Create a namespace, including any missing parents
    ///
    /// # Errors
    /// Returns error if it already exists or the name is invalid
    fn create_namespace(&mut self, namespace: &str) -> Result<(), SceneError>;

    /// Remove a namespace
    ///
    /// With `merge_with_root`, its contents move to the root first; otherwise
    /// it must be empty.
    ///
    /// # Errors
    /// Returns error if it does not exist, is the root, or is not empty
    fn remove_namespace(&mut self, namespace: &str, merge_with_root: bool)
        -> Result<(), SceneError>;

    /// Move everything inside `src` into `dst`, leaving `src` empty
    ///
    /// # Errors
    /// Returns error if either namespace is missing or `dst` is inside `src`
    fn move_namespace(&mut self, src: &str, dst: &str) -> Result<(), SceneError>;

    /// Rename `old` to `new`, placed under `parent` (root if `None`)
    ///
    /// # Errors
    /// Returns error if `old` or `parent` is missing or the target exists
    fn rename_namespace(
        &mut self,
        old: &str,
        new: &str,
        parent: Option<&str>,
    ) -> Result<(), SceneError>;

    /// Node names and child namespaces directly inside `namespace`
    ///
    /// # Errors
    /// Returns error if the namespace does not exist
    fn list_namespace_contents(&self, namespace: &str) -> Result<Vec<String>, SceneError>;

    /// Check if the node carries `attribute`
    ///
    /// # Errors
    /// Returns error if the handle is stale
    fn has_attribute(&self, node: NodeHandle, attribute: &str) -> Result<bool, SceneError>;

    /// Add an empty string attribute
    ///
    /// # Errors
    /// Returns error if the handle is stale or the attribute exists
    fn add_string_attribute(&mut self, node: NodeHandle, attribute: &str)
        -> Result<(), SceneError>;

    /// Read a string attribute
    ///
    /// # Errors
    /// Returns error if the handle is stale or the attribute is missing
    fn get_attribute(&self, node: NodeHandle, attribute: &str) -> Result<String, SceneError>;

    /// Write a string attribute
    ///
    /// # Errors
    /// Returns error if the handle is stale or the attribute is missing
    fn set_attribute(
        &mut self,
        node: NodeHandle,
        attribute: &str,
        value: &str,
    ) -> Result<(), SceneError>;

    /// Replace the selection with a single node
    ///
    /// # Errors
    /// Returns error if the handle is stale
    fn select(&mut self, node: NodeHandle) -> Result<(), SceneError>;

    /// Current selection, in selection order
    fn selection(&self) -> Vec<NodeHandle>;

    /// Replace the selection; stale handles are skipped
    ///
    /// # Errors
    /// Returns error if the service refuses the selection
    fn set_selection(&mut self, nodes: &[NodeHandle]) -> Result<(), SceneError>;

    /// Write the selected nodes to a scene file
    ///
    /// # Errors
    /// Returns error if nothing is selected or the file cannot be written
    fn export_selected(&mut self, path: &Path, options: &ExportOptions)
        -> Result<(), SceneError>;
}
