//! Type-tagged systems
//!
//! A system is a node carrying the [`SYSTEM_TYPE_ATTR`] string attribute.
//! The tag names the class that should be rebuilt from the node, which is
//! what lets a [`Factory`](crate::Factory) hand back the right type long
//! after the node was written.

use crate::error::NodeError;
use crate::node::{ClassInfo, Node, NodeClass, SceneObject};
use std::any::Any;
use std::hash::{Hash, Hasher};
use sysnode_scene::{NodeHandle, SceneError, SceneGraph};

/// Attribute holding the type tag
pub const SYSTEM_TYPE_ATTR: &str = "system_type";

/// Tag a node as a system of type `value`
///
/// Adds the attribute if missing and only writes when the value differs, so
/// it is safe to call again on an already tagged node.
///
/// # Errors
/// Returns error if the handle is stale or the scene refuses
pub fn add_system_attr(
    scene: &mut dyn SceneGraph,
    node: NodeHandle,
    value: &str,
) -> Result<(), SceneError> {
    if !scene.has_attribute(node, SYSTEM_TYPE_ATTR)? {
        scene.add_string_attribute(node, SYSTEM_TYPE_ATTR)?;
    }
    if scene.get_attribute(node, SYSTEM_TYPE_ATTR)? != value {
        scene.set_attribute(node, SYSTEM_TYPE_ATTR, value)?;
    }
    Ok(())
}

/// Instance side of a system class
pub trait SystemObject: SceneObject {
    /// Add any attribute this system expects and is missing
    ///
    /// The default writes the type tag with the class name. Overrides that
    /// add more attributes should tag the node too.
    ///
    /// # Errors
    /// Returns error if the node no longer exists or the scene refuses
    fn create_attributes(&self, scene: &mut dyn SceneGraph) -> Result<(), NodeError> {
        let handle = self.handle(scene)?;
        add_system_attr(scene, handle, self.class_name())?;
        Ok(())
    }

    /// Current type tag
    ///
    /// # Errors
    /// Returns error if the node no longer exists or is not tagged
    fn system_type(&self, scene: &dyn SceneGraph) -> Result<String, NodeError> {
        let handle = self.handle(scene)?;
        Ok(scene.get_attribute(handle, SYSTEM_TYPE_ATTR)?)
    }

    /// Overwrite the type tag
    ///
    /// Only affects what a later factory lookup builds; this wrapper keeps
    /// its class.
    ///
    /// # Errors
    /// Returns error if the node no longer exists or the scene refuses
    fn set_system_type(&self, scene: &mut dyn SceneGraph, value: &str) -> Result<(), NodeError> {
        let handle = self.handle(scene)?;
        add_system_attr(scene, handle, value)?;
        Ok(())
    }
}

impl dyn SystemObject {
    /// Downcast to a concrete class
    #[must_use]
    pub fn downcast_ref<T: SystemObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Check the concrete class
    #[must_use]
    pub fn is<T: SystemObject>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl PartialEq for dyn SystemObject {
    fn eq(&self, other: &Self) -> bool {
        Any::type_id(self.as_any()) == Any::type_id(other.as_any())
            && self.node() == other.node()
    }
}

impl Eq for dyn SystemObject {}

impl Hash for dyn SystemObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node().hash(state);
    }
}

/// A class the [`Factory`](crate::Factory) can register
///
/// Implementations must tag the node from
/// [`NodeClass::initialize`], normally by calling
/// [`SystemObject::create_attributes`]. The [`system_class!`](crate::system_class)
/// macro does this for plain subclasses.
pub trait SystemType: NodeClass + SystemObject {}

/// Root system class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct System(Node);

impl SceneObject for System {
    fn node(&self) -> &Node {
        &self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl NodeClass for System {
    const INFO: &'static ClassInfo = &ClassInfo::new("System", Some("Node"));

    fn from_node(node: Node) -> Self {
        Self(node)
    }

    fn initialize(&self, scene: &mut dyn SceneGraph) -> Result<(), NodeError> {
        self.create_attributes(scene)
    }
}

impl SystemObject for System {}

impl SystemType for System {}

/// Declare a system subclass
///
/// Generates a newtype over [`Node`](crate::Node) implementing every trait
/// the [`Factory`](crate::Factory) needs. The parent must itself be a
/// [`SystemType`](crate::SystemType).
///
/// ```rust
/// use sysnode_core::{system_class, System};
///
/// system_class! {
///     /// A rigged character
///     pub struct Character: System;
/// }
///
/// system_class! {
///     /// Character built from a camera node
///     pub struct Camera: Character = sysnode_core::ClassInfo::new("Camera", Some("Character"))
///         .with_node_type("camera");
/// }
/// ```
#[macro_export]
macro_rules! system_class {
    ($(#[$meta:meta])* $vis:vis struct $name:ident : $parent:ident;) => {
        $crate::system_class! {
            $(#[$meta])*
            $vis struct $name: $parent =
                $crate::ClassInfo::new(stringify!($name), Some(stringify!($parent)));
        }
    };
    ($(#[$meta:meta])* $vis:vis struct $name:ident : $parent:ident = $info:expr;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name($crate::Node);

        const _: fn() = || {
            fn parent_is_system<T: $crate::SystemType>() {}
            parent_is_system::<$parent>();
        };

        impl $crate::SceneObject for $name {
            fn node(&self) -> &$crate::Node {
                &self.0
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl $crate::NodeClass for $name {
            const INFO: &'static $crate::ClassInfo = &$info;

            fn from_node(node: $crate::Node) -> Self {
                Self(node)
            }

            fn initialize(
                &self,
                scene: &mut dyn $crate::SceneGraph,
            ) -> ::std::result::Result<(), $crate::NodeError> {
                $crate::SystemObject::create_attributes(self, scene)
            }
        }

        impl $crate::SystemObject for $name {}

        impl $crate::SystemType for $name {}
    };
}
