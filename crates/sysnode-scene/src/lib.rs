//! Sysnode Scene
//!
//! The scene graph service the object model is built on, plus an in-memory
//! implementation used for tests and headless tools.
//!
//! # Core Concepts
//!
//! - [`SceneGraph`]: Blocking service interface (lookup, naming, namespaces,
//!   attributes, selection, export)
//! - [`NodeHandle`]: Opaque, possibly stale reference issued by a service
//! - [`NodeId`]: Persistent identity that survives renames and save/load
//! - [`NamePath`]: Namespace-qualified name (`farm:pond:duck`)
//! - [`MemoryScene`]: Reference service backed by a generational slot map
//!
//! # Example
//!
//! ```rust
//! use sysnode_scene::{MemoryScene, SceneGraph};
//!
//! let mut scene = MemoryScene::new();
//! scene.create_namespace("farm").unwrap();
//! let duck = scene.create_node("transform", Some("farm:duck"), None).unwrap();
//! let id = scene.identity(duck).unwrap();
//!
//! scene.rename_node(duck, "farm:goose").unwrap();
//! assert_eq!(scene.identity(duck), Some(id));
//! ```

#![warn(unreachable_pub)]

mod document;
mod error;
mod graph;
mod memory;
mod name;
mod types;

pub use document::{NodeEntry, SceneDocument, DOCUMENT_VERSION};
pub use error::SceneError;
pub use graph::SceneGraph;
pub use memory::MemoryScene;
pub use name::{ends_with_separator, namespace_of, NamePath, PathError, NAMESPACE_SEPARATOR};
pub use types::{ExportFormat, ExportOptions, NodeHandle, NodeId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with scene graphs
    pub use crate::{ExportFormat, ExportOptions, MemoryScene, NodeHandle, NodeId, SceneGraph};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
