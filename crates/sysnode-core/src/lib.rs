//! Sysnode Core
//!
//! Typed, identity-stable wrappers over nodes of an external scene graph:
//! - Wrappers bind to a node's persistent identity, not its name, and fail
//!   loudly once the node is deleted
//! - Systems tag their node with their class name
//! - A factory turns a tag back into the right class, even in a later session
//!
//! # Core Concepts
//!
//! - [`Node`]: Identity core of every wrapper, and the base class
//! - [`SceneObject`] / [`NodeClass`]: Instance and static sides of a class
//! - [`System`]: Root of the type-tagged classes
//! - [`Factory`]: Tag → class registry with a [`System`] fallback
//! - [`SelectionGuard`]: Restores the scene selection on drop
//!
//! # Example
//!
//! ```rust
//! use sysnode_core::prelude::*;
//!
//! system_class! {
//!     /// A rigged character
//!     pub struct Character: System;
//! }
//!
//! let factory = Factory::builder().declare::<Character>().build();
//! let mut scene = MemoryScene::new();
//!
//! let hero = Character::create(&mut scene, Some("hero"), None).unwrap();
//! hero.rename(&mut scene, "cast:hero").unwrap();
//!
//! let found = factory.get_system(&scene, hero.identity()).unwrap();
//! assert!(found.is::<Character>());
//! assert_eq!(found.name(&scene).unwrap(), "cast:hero");
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod factory;
pub mod logging;
pub mod node;
pub mod selection;
pub mod system;

pub use config::{LoggingConfig, SysnodeConfig};
pub use error::{ConfigError, NodeError};
pub use factory::{ConstructFn, DeserializeFn, Factory, FactoryBuilder, SystemClass};
pub use node::{
    ClassInfo, Fields, Node, NodeClass, NodeRef, SceneObject, DEFAULT_NAME, DEFAULT_NODE_TYPE,
    TYPE_FIELD,
};
pub use selection::SelectionGuard;
pub use system::{add_system_attr, System, SystemObject, SystemType, SYSTEM_TYPE_ATTR};

pub use sysnode_scene::{
    ExportFormat, ExportOptions, MemoryScene, NodeHandle, NodeId, SceneError, SceneGraph,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Sysnode Core
    pub use crate::{
        system_class, ExportOptions, Factory, MemoryScene, Node, NodeClass, NodeError, NodeRef,
        SceneGraph, SceneObject, System, SystemObject, SystemType,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
