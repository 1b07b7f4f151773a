//! System factory
//!
//! Provides [`Factory`], the registry that turns a node's type tag back into
//! the right system class.
//!
//! Classes are first *declared*, which adds them to the factory's catalog of
//! known classes together with their parent. Registering a class then adds
//! it and, transitively, every declared subclass to the registry. There is
//! no process-wide instance; build one at start-up and pass it down.

use crate::error::NodeError;
use crate::node::{ClassInfo, Fields, Node, NodeClass, NodeRef, TYPE_FIELD};
use crate::system::{System, SystemObject, SystemType, SYSTEM_TYPE_ATTR};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug, Formatter};
use sysnode_scene::SceneGraph;

/// Wraps a bound node as a system class
pub type ConstructFn = fn(Node) -> Box<dyn SystemObject>;

/// Rebuilds a system class from serialized fields
pub type DeserializeFn = fn(
    &mut dyn SceneGraph,
    Option<&str>,
    Option<&NodeRef>,
    &Fields,
) -> Result<Box<dyn SystemObject>, NodeError>;

/// Runtime descriptor of a system class
#[derive(Clone, Copy)]
pub struct SystemClass {
    info: &'static ClassInfo,
    construct: ConstructFn,
    deserialize: DeserializeFn,
}

fn construct<T: SystemType>(node: Node) -> Box<dyn SystemObject> {
    Box::new(T::from_node(node))
}

fn deserialize<T: SystemType>(
    scene: &mut dyn SceneGraph,
    name: Option<&str>,
    parent: Option<&NodeRef>,
    extra: &Fields,
) -> Result<Box<dyn SystemObject>, NodeError> {
    Ok(Box::new(T::deserialize(scene, name, parent, extra)?))
}

impl SystemClass {
    /// Descriptor for `T`
    #[inline]
    #[must_use]
    pub fn of<T: SystemType>() -> Self {
        Self {
            info: T::INFO,
            construct: construct::<T>,
            deserialize: deserialize::<T>,
        }
    }

    /// Class name (the type tag)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.info.name
    }

    /// Declared parent class
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&'static str> {
        self.info.parent
    }

    /// Class metadata
    #[inline]
    #[must_use]
    pub fn info(&self) -> &'static ClassInfo {
        self.info
    }

    /// Wrap `node` as this class
    #[must_use]
    pub fn construct(&self, node: Node) -> Box<dyn SystemObject> {
        (self.construct)(node.with_class(self.info))
    }

    /// Rebuild an instance of this class from serialized fields
    ///
    /// # Errors
    /// Returns error if the class fails to create or restore the node
    pub fn deserialize(
        &self,
        scene: &mut dyn SceneGraph,
        name: Option<&str>,
        parent: Option<&NodeRef>,
        extra: &Fields,
    ) -> Result<Box<dyn SystemObject>, NodeError> {
        (self.deserialize)(scene, name, parent, extra)
    }
}

impl Debug for SystemClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemClass")
            .field("name", &self.info.name)
            .field("parent", &self.info.parent)
            .finish_non_exhaustive()
    }
}

impl PartialEq for SystemClass {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info
    }
}

/// Registry mapping type tags to system classes
#[derive(Debug, Clone)]
pub struct Factory {
    classes: BTreeMap<&'static str, SystemClass>,
    catalog: Vec<SystemClass>,
}

impl Factory {
    /// Create an empty registry whose catalog knows only [`System`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            catalog: vec![SystemClass::of::<System>()],
        }
    }

    /// Builder for declaring the classes available at start-up
    #[must_use]
    pub fn builder() -> FactoryBuilder {
        FactoryBuilder {
            factory: Self::new(),
        }
    }

    /// Create registry with [`System`] registered
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::builder().build()
    }

    /// Declare `T` as loaded without registering it
    pub fn declare<T: SystemType>(&mut self) {
        self.declare_class(SystemClass::of::<T>());
    }

    /// Declare a class, replacing any earlier declaration with the same name
    ///
    /// A replaced class takes effect in the registry on the next
    /// [`register`](Self::register) that reaches it.
    pub fn declare_class(&mut self, class: SystemClass) {
        match self.catalog.iter_mut().find(|c| c.name() == class.name()) {
            Some(slot) => *slot = class,
            None => self.catalog.push(class),
        }
    }

    /// Register a class and every declared subclass, transitively
    ///
    /// Existing entries are overwritten. Cyclic parent declarations are
    /// visited once.
    pub fn register(&mut self, class: SystemClass) {
        self.declare_class(class);

        let mut pending = vec![class];
        let mut visited = BTreeSet::new();
        while let Some(class) = pending.pop() {
            if !visited.insert(class.name()) {
                continue;
            }
            tracing::debug!("Registering system class {}", class.name());
            self.classes.insert(class.name(), class);
            pending.extend(
                self.catalog
                    .iter()
                    .filter(|c| c.parent() == Some(class.name()))
                    .copied(),
            );
        }
    }

    /// Register `T` and its declared subclasses
    pub fn register_type<T: SystemType>(&mut self) {
        self.register(SystemClass::of::<T>());
    }

    /// Class to build for the node behind `node_ref`
    ///
    /// Returns `None` if the node does not exist or carries no type tag. A
    /// tag that is not registered resolves to [`System`].
    #[must_use]
    pub fn get_system_class(
        &self,
        scene: &dyn SceneGraph,
        node_ref: impl Into<NodeRef>,
    ) -> Option<SystemClass> {
        let handle = node_ref.into().resolve(scene)?;
        if !scene.has_attribute(handle, SYSTEM_TYPE_ATTR).ok()? {
            return None;
        }
        let tag = scene.get_attribute(handle, SYSTEM_TYPE_ATTR).ok()?;
        Some(self.lookup(&tag))
    }

    /// Build the system at `node_ref` as its tagged class
    ///
    /// Returns `None` where [`get_system_class`](Self::get_system_class) does.
    #[must_use]
    pub fn get_system(
        &self,
        scene: &dyn SceneGraph,
        node_ref: impl Into<NodeRef>,
    ) -> Option<Box<dyn SystemObject>> {
        let node_ref = node_ref.into();
        let class = self.get_system_class(scene, &node_ref)?;
        let node = Node::bind_ref(scene, &node_ref, class.info()).ok()?;
        Some(class.construct(node))
    }

    /// Rebuild a system from fields produced by `serialize`
    ///
    /// The `type` field picks the class, with the same fallback to
    /// [`System`] as tag lookups.
    ///
    /// # Errors
    /// Returns error if `type` is missing or the class fails to rebuild
    pub fn deserialize(
        &self,
        scene: &mut dyn SceneGraph,
        data: &Fields,
        name: Option<&str>,
        parent: Option<&NodeRef>,
    ) -> Result<Box<dyn SystemObject>, NodeError> {
        let tag = data
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| NodeError::InvalidData(format!("missing '{TYPE_FIELD}' field")))?;
        self.lookup(tag).deserialize(scene, name, parent, data)
    }

    /// Check if a tag is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered class for a tag
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SystemClass> {
        self.classes.get(name).copied()
    }

    /// List all registered tags
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.classes.keys().copied().collect()
    }

    /// Get number of registered classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate over registered classes, by tag
    pub fn iter(&self) -> impl Iterator<Item = &SystemClass> {
        self.classes.values()
    }

    fn lookup(&self, tag: &str) -> SystemClass {
        self.get(tag).unwrap_or_else(|| {
            tracing::debug!("Unregistered system type {tag}, using System");
            self.get(System::INFO.name)
                .unwrap_or_else(SystemClass::of::<System>)
        })
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

/// Declares the classes loaded at start-up, then registers [`System`]
#[derive(Debug)]
pub struct FactoryBuilder {
    factory: Factory,
}

impl FactoryBuilder {
    /// Declare `T`
    #[must_use]
    pub fn declare<T: SystemType>(mut self) -> Self {
        self.factory.declare::<T>();
        self
    }

    /// Declare a class descriptor
    #[must_use]
    pub fn declare_class(mut self, class: SystemClass) -> Self {
        self.factory.declare_class(class);
        self
    }

    /// Register [`System`] with every declared descendant
    #[must_use]
    pub fn build(mut self) -> Factory {
        self.factory.register_type::<System>();
        self.factory
    }
}
