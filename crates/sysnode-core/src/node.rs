//! Identity-bound node wrappers
//!
//! A [`Node`] binds a wrapper to one scene node by its persistent
//! [`NodeId`]. The handle it caches is re-validated on every access, so a
//! wrapper that outlives its node fails with
//! [`NodeError::StaleReference`] instead of touching a different node.
//!
//! Classes are split in two traits:
//! - [`SceneObject`]: the object-safe instance side (name, namespace,
//!   delete, export, serialize)
//! - [`NodeClass`]: the static side (class metadata, `create`,
//!   `deserialize`, `bind`)

use crate::error::NodeError;
use crate::selection::SelectionGuard;
use indexmap::IndexMap;
use serde_json::Value;
use std::any::Any;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::path::Path;
use sysnode_scene::{
    ends_with_separator, namespace_of, ExportOptions, NodeHandle, NodeId, SceneGraph,
    NAMESPACE_SEPARATOR,
};

/// Serialized form of a wrapper, `type` first
pub type Fields = IndexMap<String, Value>;

/// Key holding the class name in [`Fields`]
pub const TYPE_FIELD: &str = "type";

/// Scene node type created for classes that do not override it
pub const DEFAULT_NODE_TYPE: &str = "transform";

/// Leaf name appended to names that end with the namespace separator
pub const DEFAULT_NAME: &str = "grp";

/// Static description of a wrapper class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassInfo {
    /// Class name, also the type tag written on system nodes
    pub name: &'static str,
    /// Name of the parent class
    pub parent: Option<&'static str>,
    /// Scene node type created by `create`
    pub node_type: &'static str,
    /// Leaf appended to names ending with the namespace separator
    pub default_name: &'static str,
}

impl ClassInfo {
    /// Class with default node type and default name
    #[must_use]
    pub const fn new(name: &'static str, parent: Option<&'static str>) -> Self {
        Self {
            name,
            parent,
            node_type: DEFAULT_NODE_TYPE,
            default_name: DEFAULT_NAME,
        }
    }

    /// With scene node type
    #[must_use]
    pub const fn with_node_type(self, node_type: &'static str) -> Self {
        Self { node_type, ..self }
    }

    /// With default leaf name
    #[must_use]
    pub const fn with_default_name(self, default_name: &'static str) -> Self {
        Self {
            default_name,
            ..self
        }
    }
}

/// Identity core of every wrapper, and the base `Node` class itself
///
/// Equality is class-sensitive: two wrappers are equal only if they have the
/// same class and the same identity. Hashing uses the identity alone, so a
/// node stays usable as a map key across renames. Compared as
/// `dyn SceneObject`, wrappers must also be the same Rust type, so a class
/// redefined under an old name never equals wrappers of the old definition.
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    handle: NodeHandle,
    class: &'static ClassInfo,
}

impl Node {
    /// Bind to the live node behind `handle`
    ///
    /// # Errors
    /// Returns error if the handle is stale
    pub fn attach(
        scene: &dyn SceneGraph,
        handle: NodeHandle,
        class: &'static ClassInfo,
    ) -> Result<Self, NodeError> {
        let id = scene
            .identity(handle)
            .ok_or_else(|| NodeError::NotFound(handle.to_string()))?;
        Ok(Self { id, handle, class })
    }

    /// Bind to whatever `node_ref` resolves to
    ///
    /// # Errors
    /// Returns error if the reference does not resolve
    pub fn bind_ref(
        scene: &dyn SceneGraph,
        node_ref: &NodeRef,
        class: &'static ClassInfo,
    ) -> Result<Self, NodeError> {
        let handle = node_ref
            .resolve(scene)
            .ok_or_else(|| NodeError::NotFound(node_ref.to_string()))?;
        Self::attach(scene, handle, class)
    }

    /// Persistent identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Class this wrapper was built as
    #[inline]
    #[must_use]
    pub fn class(&self) -> &'static ClassInfo {
        self.class
    }

    /// Handle cached at bind time, possibly stale
    #[inline]
    #[must_use]
    pub fn cached_handle(&self) -> NodeHandle {
        self.handle
    }

    /// Same identity, rebound as another class
    #[must_use]
    pub fn with_class(self, class: &'static ClassInfo) -> Self {
        Self { class, ..self }
    }

    /// Live handle to the wrapped node
    ///
    /// The cached handle is used when it still points at this identity;
    /// otherwise the identity is looked up again.
    ///
    /// # Errors
    /// Returns [`NodeError::StaleReference`] if the node no longer exists
    pub fn live_handle(&self, scene: &dyn SceneGraph) -> Result<NodeHandle, NodeError> {
        if scene.identity(self.handle).as_ref() == Some(&self.id) {
            return Ok(self.handle);
        }
        scene
            .resolve(self.id.as_str())
            .filter(|h| scene.identity(*h).as_ref() == Some(&self.id))
            .ok_or_else(|| NodeError::StaleReference {
                class: self.class.name,
                id: self.id.clone(),
            })
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.class.name, self.id)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.class.name == other.class.name && self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Anything that names a node: a name, an identity or a handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// Node name or identity string
    Path(String),
    /// Handle issued by the scene
    Handle(NodeHandle),
}

impl NodeRef {
    /// Resolve to a live handle
    #[must_use]
    pub fn resolve(&self, scene: &dyn SceneGraph) -> Option<NodeHandle> {
        match self {
            Self::Path(path) => scene.resolve(path),
            Self::Handle(handle) => scene.is_alive(*handle).then_some(*handle),
        }
    }
}

impl Display for NodeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.write_str(path),
            Self::Handle(handle) => Display::fmt(handle, f),
        }
    }
}

impl From<&str> for NodeRef {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for NodeRef {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<&NodeId> for NodeRef {
    fn from(id: &NodeId) -> Self {
        Self::Path(id.to_string())
    }
}

impl From<NodeHandle> for NodeRef {
    fn from(handle: NodeHandle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&Node> for NodeRef {
    fn from(node: &Node) -> Self {
        Self::from(node.id())
    }
}

impl From<&NodeRef> for NodeRef {
    fn from(node_ref: &NodeRef) -> Self {
        node_ref.clone()
    }
}

/// Instance side of a wrapper class
///
/// Only [`node`](Self::node) and [`as_any`](Self::as_any) are required;
/// everything else is provided on top of the bound [`Node`]. Every method
/// that reads or writes the scene first checks that the node still exists.
pub trait SceneObject: Any + Debug {
    /// Bound identity
    fn node(&self) -> &Node;

    /// Upcast for downcasting to the concrete class
    fn as_any(&self) -> &dyn Any;

    /// Class metadata
    fn class_info(&self) -> &'static ClassInfo {
        self.node().class()
    }

    /// Class name
    fn class_name(&self) -> &'static str {
        self.class_info().name
    }

    /// Persistent identity
    fn identity(&self) -> &NodeId {
        self.node().id()
    }

    /// Live handle to the wrapped node
    ///
    /// # Errors
    /// Returns [`NodeError::StaleReference`] if the node no longer exists
    fn handle(&self, scene: &dyn SceneGraph) -> Result<NodeHandle, NodeError> {
        self.node().live_handle(scene)
    }

    /// Current namespace-qualified name
    ///
    /// # Errors
    /// Returns error if the node no longer exists
    fn name(&self, scene: &dyn SceneGraph) -> Result<String, NodeError> {
        let handle = self.handle(scene)?;
        Ok(scene.get_name(handle)?)
    }

    /// Name without its namespace
    ///
    /// # Errors
    /// Returns error if the node no longer exists
    fn short_name(&self, scene: &dyn SceneGraph) -> Result<String, NodeError> {
        let name = self.name(scene)?;
        Ok(match name.rsplit_once(NAMESPACE_SEPARATOR) {
            Some((_, leaf)) => leaf.to_string(),
            None => name,
        })
    }

    /// Namespace of the current name, empty at root
    ///
    /// # Errors
    /// Returns error if the node no longer exists
    fn namespace(&self, scene: &dyn SceneGraph) -> Result<String, NodeError> {
        let handle = self.handle(scene)?;
        Ok(scene.get_namespace(handle)?)
    }

    /// Rename the node, returning the name the scene actually gave it
    ///
    /// Crossing a namespace boundary goes through
    /// [`set_namespace`](Self::set_namespace) first, so the node's whole
    /// namespace moves with it. A name ending with the separator gets the
    /// class default name appended.
    ///
    /// # Errors
    /// Returns error if the node no longer exists or the scene refuses
    fn rename(&self, scene: &mut dyn SceneGraph, value: &str) -> Result<String, NodeError> {
        let handle = self.handle(scene)?;
        let current = scene.get_name(handle)?;
        let target_ns = namespace_of(value);

        if current.contains(NAMESPACE_SEPARATOR) {
            self.set_namespace(scene, target_ns)?;
        } else if !target_ns.is_empty() && !scene.namespace_exists(target_ns) {
            scene.create_namespace(target_ns)?;
        }

        let mut value = value.to_string();
        if ends_with_separator(&value) {
            value.push_str(self.class_info().default_name);
        }
        Ok(scene.rename_node(handle, &value)?)
    }

    /// Move the node into another namespace
    ///
    /// - target exists: the current namespace is merged into it
    /// - target nested under a missing parent: the parent is created, then
    ///   the current namespace is renamed into it
    /// - target empty: the current namespace is merged with the root
    /// - node at root, or target inside the current namespace: the node
    ///   alone moves, creating the target if needed
    ///
    /// # Errors
    /// Returns error if the node no longer exists or the scene refuses
    fn set_namespace(&self, scene: &mut dyn SceneGraph, value: &str) -> Result<(), NodeError> {
        let handle = self.handle(scene)?;
        let ns = scene.get_namespace(handle)?;
        if ns == value {
            return Ok(());
        }

        if ns.is_empty() || value.starts_with(&format!("{ns}{NAMESPACE_SEPARATOR}")) {
            move_node(scene, handle, value)?;
        } else if value.is_empty() {
            scene.remove_namespace(&ns, true)?;
        } else if scene.namespace_exists(value) {
            scene.move_namespace(&ns, value)?;
        } else if let Some((parent, leaf)) = value.rsplit_once(NAMESPACE_SEPARATOR) {
            if !scene.namespace_exists(parent) {
                scene.create_namespace(parent)?;
            }
            scene.rename_namespace(&ns, leaf, Some(parent))?;
        } else {
            scene.rename_namespace(&ns, value, None)?;
        }
        Ok(())
    }

    /// Delete the node, and its namespace if that leaves it empty
    ///
    /// # Errors
    /// Returns error if the node no longer exists or the scene refuses
    fn delete(&self, scene: &mut dyn SceneGraph) -> Result<(), NodeError> {
        let handle = self.handle(scene)?;
        let ns = scene.get_namespace(handle)?;
        let description = self.describe(scene)?;

        scene.delete_node(handle)?;
        if !ns.is_empty()
            && scene.namespace_exists(&ns)
            && scene.list_namespace_contents(&ns)?.is_empty()
        {
            scene.remove_namespace(&ns, false)?;
        }
        tracing::debug!("{description} deleted");
        Ok(())
    }

    /// Export the node to a scene file
    ///
    /// The scene selection is restored afterwards, whether or not the export
    /// succeeds.
    ///
    /// # Errors
    /// Returns error if the node no longer exists or the export fails
    fn export(
        &self,
        scene: &mut dyn SceneGraph,
        path: &Path,
        options: &ExportOptions,
    ) -> Result<(), NodeError> {
        let handle = self.handle(scene)?;
        let description = self.describe(scene)?;
        {
            let mut guard = SelectionGuard::new(scene);
            guard.select(handle)?;
            guard.export_selected(path, options)?;
        }
        tracing::info!("{description} exported to {}", path.display());
        Ok(())
    }

    /// Hook for subclasses to append their own fields after `type`
    ///
    /// # Errors
    /// Returns error if a field cannot be read from the scene
    fn serialize_fields(&self, scene: &dyn SceneGraph, fields: &mut Fields) -> Result<(), NodeError> {
        let _ = (scene, fields);
        Ok(())
    }

    /// Data needed to rebuild this exact class
    ///
    /// # Errors
    /// Returns error if the node no longer exists
    fn serialize(&self, scene: &dyn SceneGraph) -> Result<Fields, NodeError> {
        let description = self.describe(scene)?;
        tracing::trace!("Serializing {description}");

        let mut fields = Fields::new();
        fields.insert(TYPE_FIELD.to_string(), Value::from(self.class_name()));
        self.serialize_fields(scene, &mut fields)?;
        Ok(fields)
    }

    /// `Class('name')`
    ///
    /// # Errors
    /// Returns error if the node no longer exists
    fn describe(&self, scene: &dyn SceneGraph) -> Result<String, NodeError> {
        Ok(format!("{}('{}')", self.class_name(), self.name(scene)?))
    }
}

/// Move a single node into `ns`, keeping its leaf name
fn move_node(scene: &mut dyn SceneGraph, handle: NodeHandle, ns: &str) -> Result<(), NodeError> {
    if !scene.namespace_exists(ns) {
        scene.create_namespace(ns)?;
    }
    let name = scene.get_name(handle)?;
    let leaf = name
        .rsplit_once(NAMESPACE_SEPARATOR)
        .map_or(name.as_str(), |(_, leaf)| leaf);
    scene.rename_node(handle, &format!("{ns}{NAMESPACE_SEPARATOR}{leaf}"))?;
    Ok(())
}

impl dyn SceneObject {
    /// Downcast to a concrete class
    #[must_use]
    pub fn downcast_ref<T: SceneObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Check the concrete class
    #[must_use]
    pub fn is<T: SceneObject>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl PartialEq for dyn SceneObject {
    fn eq(&self, other: &Self) -> bool {
        Any::type_id(self.as_any()) == Any::type_id(other.as_any())
            && self.node() == other.node()
    }
}

impl Eq for dyn SceneObject {}

impl Hash for dyn SceneObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node().hash(state);
    }
}

/// Static side of a wrapper class
pub trait NodeClass: SceneObject + Sized {
    /// Class metadata
    const INFO: &'static ClassInfo;

    /// Wrap an already bound node
    fn from_node(node: Node) -> Self;

    /// Runs once after `create` made the node
    ///
    /// # Errors
    /// Returns error if the scene refuses
    fn initialize(&self, scene: &mut dyn SceneGraph) -> Result<(), NodeError> {
        let _ = scene;
        Ok(())
    }

    /// Create a new node of this class
    ///
    /// Without a name the scene names it after the node type, resolving
    /// clashes itself. A name ending with the separator gets the class
    /// default name appended; a missing namespace is created.
    ///
    /// # Errors
    /// Returns error if the parent does not resolve or the scene refuses
    fn create(
        scene: &mut dyn SceneGraph,
        name: Option<&str>,
        parent: Option<&NodeRef>,
    ) -> Result<Self, NodeError> {
        let info = Self::INFO;
        let parent = match parent {
            Some(parent) => Some(
                parent
                    .resolve(scene)
                    .ok_or_else(|| NodeError::NotFound(parent.to_string()))?,
            ),
            None => None,
        };

        let mut name = name
            .filter(|n| !n.is_empty())
            .unwrap_or(info.node_type)
            .to_string();
        tracing::debug!("Creating {}({name})", info.name);
        if ends_with_separator(&name) {
            name.push_str(info.default_name);
        }

        let ns = namespace_of(&name);
        if !ns.is_empty() && !scene.namespace_exists(ns) {
            scene.create_namespace(ns)?;
        }

        let handle = scene.create_node(info.node_type, Some(&name), parent)?;
        let created = Self::from_node(Node::attach(scene, handle, info)?);
        created.initialize(scene)?;
        Ok(created)
    }

    /// Rebuild from serialized data
    ///
    /// Creates a fresh node; classes with extra fields restore them from
    /// `extra`.
    ///
    /// # Errors
    /// Returns error if creation fails or `extra` is malformed
    fn deserialize(
        scene: &mut dyn SceneGraph,
        name: Option<&str>,
        parent: Option<&NodeRef>,
        extra: &Fields,
    ) -> Result<Self, NodeError> {
        let _ = extra;
        Self::create(scene, name, parent)
    }

    /// Wrap an existing node
    ///
    /// # Errors
    /// Returns [`NodeError::NotFound`] if the reference does not resolve
    fn bind(scene: &dyn SceneGraph, node_ref: impl Into<NodeRef>) -> Result<Self, NodeError> {
        Ok(Self::from_node(Node::bind_ref(
            scene,
            &node_ref.into(),
            Self::INFO,
        )?))
    }
}

impl SceneObject for Node {
    fn node(&self) -> &Node {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl NodeClass for Node {
    const INFO: &'static ClassInfo = &ClassInfo::new("Node", None);

    fn from_node(node: Node) -> Self {
        node
    }
}
