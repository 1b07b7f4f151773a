//! Testing utilities for the sysnode workspace
//!
//! Shared class hierarchy, factory and scene fixtures.
//!
//! ```text
//! System
//! ├── Asset       (hand-written, versioned)
//! │   └── Character
//! └── Prop        (locator node)
//! ```

#![allow(missing_docs)]

use serde_json::Value;
use std::any::Any;
use sysnode_core::{
    add_system_attr, system_class, ClassInfo, Factory, Fields, Node, NodeClass, NodeError,
    NodeRef, SceneObject, System, SystemObject, SystemType,
};
use sysnode_scene::{MemoryScene, NodeHandle, SceneGraph};

/// Attribute holding an asset's version
pub const VERSION_ATTR: &str = "asset_version";

/// Serialized field holding an asset's version
pub const VERSION_FIELD: &str = "version";

/// Versioned system with its own attribute and serialized field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset(Node);

impl Asset {
    pub fn version(&self, scene: &dyn SceneGraph) -> Result<u64, NodeError> {
        let handle = self.handle(scene)?;
        let raw = scene.get_attribute(handle, VERSION_ATTR)?;
        raw.parse()
            .map_err(|_| NodeError::InvalidData(format!("bad asset version '{raw}'")))
    }

    pub fn set_version(&self, scene: &mut dyn SceneGraph, version: u64) -> Result<(), NodeError> {
        let handle = self.handle(scene)?;
        scene.set_attribute(handle, VERSION_ATTR, &version.to_string())?;
        Ok(())
    }
}

impl SceneObject for Asset {
    fn node(&self) -> &Node {
        &self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn serialize_fields(&self, scene: &dyn SceneGraph, fields: &mut Fields) -> Result<(), NodeError> {
        fields.insert(VERSION_FIELD.to_string(), Value::from(self.version(scene)?));
        Ok(())
    }
}

impl NodeClass for Asset {
    const INFO: &'static ClassInfo = &ClassInfo::new("Asset", Some("System"));

    fn from_node(node: Node) -> Self {
        Self(node)
    }

    fn initialize(&self, scene: &mut dyn SceneGraph) -> Result<(), NodeError> {
        self.create_attributes(scene)
    }

    fn deserialize(
        scene: &mut dyn SceneGraph,
        name: Option<&str>,
        parent: Option<&NodeRef>,
        extra: &Fields,
    ) -> Result<Self, NodeError> {
        let asset = Self::create(scene, name, parent)?;
        if let Some(version) = extra.get(VERSION_FIELD) {
            let version = version
                .as_u64()
                .ok_or_else(|| NodeError::InvalidData(format!("bad asset version {version}")))?;
            asset.set_version(scene, version)?;
        }
        Ok(asset)
    }
}

impl SystemObject for Asset {
    fn create_attributes(&self, scene: &mut dyn SceneGraph) -> Result<(), NodeError> {
        let handle = self.handle(scene)?;
        add_system_attr(scene, handle, self.class_name())?;
        if !scene.has_attribute(handle, VERSION_ATTR)? {
            scene.add_string_attribute(handle, VERSION_ATTR)?;
            scene.set_attribute(handle, VERSION_ATTR, "1")?;
        }
        Ok(())
    }
}

impl SystemType for Asset {}

system_class! {
    /// Asset subclass
    pub struct Character: Asset;
}

system_class! {
    /// System built on a locator node
    pub struct Prop: System = ClassInfo::new("Prop", Some("System")).with_node_type("locator");
}

/// Factory with the fixture hierarchy declared and registered
pub fn factory() -> Factory {
    Factory::builder()
        .declare::<Asset>()
        .declare::<Character>()
        .declare::<Prop>()
        .build()
}

/// Scene holding a single `System` named `duck`
pub fn scene_with_duck() -> (MemoryScene, System) {
    let mut scene = MemoryScene::new();
    let duck = System::create(&mut scene, Some("duck"), None).unwrap();
    (scene, duck)
}

/// Plain node without a type tag
pub fn untagged_node(scene: &mut MemoryScene, name: &str) -> NodeHandle {
    scene.create_node("transform", Some(name), None).unwrap()
}

/// Node tagged with an arbitrary type
pub fn tagged_node(scene: &mut MemoryScene, name: &str, tag: &str) -> NodeHandle {
    let handle = untagged_node(scene, name);
    add_system_attr(scene, handle, tag).unwrap();
    handle
}
