//! In-memory scene graph
//!
//! [`MemoryScene`] implements [`SceneGraph`] over a generational slot map so
//! that handles go stale exactly when a real host's would: deleting a node
//! invalidates every handle to it, and a reused slot never revives an old
//! handle. It follows the usual authoring-tool conventions for names:
//! names are unique scene-wide and clashes get the next free number.

use crate::document::{NodeEntry, SceneDocument};
use crate::error::SceneError;
use crate::graph::SceneGraph;
use crate::name::{NamePath, PathError};
use crate::types::{ExportFormat, ExportOptions, NodeHandle, NodeId};
use indexmap::IndexMap;
use slotmap::{DefaultKey, Key, KeyData, SlotMap};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

type NodeKey = DefaultKey;

#[derive(Debug, Clone)]
struct NodeRecord {
    id: NodeId,
    node_type: String,
    name: NamePath,
    parent: Option<NodeKey>,
    attributes: IndexMap<String, String>,
    seq: u64,
}

/// Scene graph held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: SlotMap<NodeKey, NodeRecord>,
    namespaces: BTreeSet<NamePath>,
    selection: Vec<NodeKey>,
    next_seq: u64,
}

impl MemoryScene {
    /// Empty scene
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene holds no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All namespaces, parents before children
    #[must_use]
    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.iter().map(ToString::to_string).collect()
    }

    /// Names of all live nodes, in creation order
    #[must_use]
    pub fn node_names(&self) -> Vec<String> {
        self.ordered_keys()
            .into_iter()
            .map(|k| self.nodes[k].name.to_string())
            .collect()
    }

    /// Snapshot of the whole scene
    #[must_use]
    pub fn to_document(&self, format: ExportFormat) -> SceneDocument {
        let mut doc = self.document_for(&self.ordered_keys(), format, true);
        doc.namespaces = self.namespaces();
        doc
    }

    /// Rebuild a scene from a document
    ///
    /// Identities, names, namespaces, parents and attributes are restored;
    /// handles are new.
    ///
    /// # Errors
    /// Returns error if the document holds invalid or duplicate names,
    /// duplicate identities or a parent cycle
    pub fn from_document(doc: &SceneDocument) -> Result<Self, SceneError> {
        let mut scene = Self::new();
        for ns in &doc.namespaces {
            let path: NamePath = ns.parse()?;
            scene.insert_namespace(&path);
        }

        let mut by_id: HashMap<NodeId, NodeKey> = HashMap::with_capacity(doc.nodes.len());
        for entry in &doc.nodes {
            let name: NamePath = entry.name.parse()?;
            if name.is_empty() {
                return Err(SceneError::InvalidDocument("node with empty name".into()));
            }
            if by_id.contains_key(&entry.id) {
                return Err(SceneError::InvalidDocument(format!(
                    "duplicate identity {}",
                    entry.id
                )));
            }
            if scene.name_taken(&name, None) {
                return Err(SceneError::InvalidDocument(format!(
                    "duplicate name {name}"
                )));
            }
            if let Some(ns) = name.parent() {
                scene.insert_namespace(&ns);
            }
            let key = scene.insert_record(entry.id.clone(), &entry.node_type, name, None);
            scene.nodes[key].attributes = entry.attributes.clone();
            by_id.insert(entry.id.clone(), key);
        }

        for entry in &doc.nodes {
            let Some(parent_id) = &entry.parent else {
                continue;
            };
            match (by_id.get(parent_id), by_id.get(&entry.id)) {
                (Some(&parent), Some(&key)) => scene.nodes[key].parent = Some(parent),
                _ => tracing::warn!(
                    node = %entry.name,
                    parent = %parent_id,
                    "dropping reference to a parent outside the document"
                ),
            }
        }

        for key in scene.nodes.keys() {
            let mut seen = HashSet::new();
            let mut current = Some(key);
            while let Some(k) = current {
                if !seen.insert(k) {
                    return Err(SceneError::InvalidDocument(format!(
                        "parent cycle through {}",
                        scene.nodes[k].name
                    )));
                }
                current = scene.nodes[k].parent;
            }
        }

        Ok(scene)
    }

    /// Write the whole scene to `path`
    ///
    /// # Errors
    /// Returns error if encoding or writing fails
    pub fn save(&self, path: &Path, format: ExportFormat) -> Result<(), SceneError> {
        self.to_document(format).write(path)
    }

    /// Load a scene written by [`save`](Self::save) or an export
    ///
    /// # Errors
    /// Returns error if reading or decoding fails
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        Self::from_document(&SceneDocument::read(path)?)
    }

    fn key(&self, node: NodeHandle) -> Result<NodeKey, SceneError> {
        let key = NodeKey::from(KeyData::from_ffi(node.raw()));
        if self.nodes.contains_key(key) {
            Ok(key)
        } else {
            Err(SceneError::InvalidHandle(node))
        }
    }

    fn record(&self, node: NodeHandle) -> Result<&NodeRecord, SceneError> {
        let key = self.key(node)?;
        Ok(&self.nodes[key])
    }

    fn record_mut(&mut self, node: NodeHandle) -> Result<&mut NodeRecord, SceneError> {
        let key = self.key(node)?;
        Ok(&mut self.nodes[key])
    }

    fn ordered_keys(&self) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = self.nodes.keys().collect();
        keys.sort_by_key(|k| self.nodes[*k].seq);
        keys
    }

    fn insert_record(
        &mut self,
        id: NodeId,
        node_type: &str,
        name: NamePath,
        parent: Option<NodeKey>,
    ) -> NodeKey {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.nodes.insert(NodeRecord {
            id,
            node_type: node_type.to_string(),
            name,
            parent,
            attributes: IndexMap::new(),
            seq,
        })
    }

    fn insert_namespace(&mut self, ns: &NamePath) {
        if ns.is_empty() {
            return;
        }
        for ancestor in ns.ancestors() {
            self.namespaces.insert(ancestor);
        }
        self.namespaces.insert(ns.clone());
    }

    fn has_namespace(&self, ns: &NamePath) -> bool {
        ns.is_empty() || self.namespaces.contains(ns)
    }

    fn require_namespace(&self, ns: &NamePath) -> Result<(), SceneError> {
        if self.has_namespace(ns) {
            Ok(())
        } else {
            Err(SceneError::NamespaceNotFound(ns.to_string()))
        }
    }

    /// Parse a namespace that must exist and must not be the root
    fn existing_namespace(&self, namespace: &str) -> Result<NamePath, SceneError> {
        let path: NamePath = namespace.parse()?;
        if path.is_empty() {
            return Err(SceneError::InvalidNamespace {
                namespace: namespace.to_string(),
                reason: "the root namespace cannot be changed",
            });
        }
        self.require_namespace(&path)?;
        Ok(path)
    }

    fn parse_node_name(name: &str) -> Result<NamePath, SceneError> {
        let path: NamePath = name.parse()?;
        if path.is_empty() {
            return Err(PathError::EmptySegment(name.to_string()).into());
        }
        Ok(path)
    }

    fn name_taken(&self, name: &NamePath, except: Option<NodeKey>) -> bool {
        self.nodes
            .iter()
            .any(|(k, r)| Some(k) != except && &r.name == name)
    }

    /// First free name, numbering the leaf on a clash (`duck` → `duck1`)
    fn unique_name(&self, requested: NamePath, except: Option<NodeKey>) -> NamePath {
        if !self.name_taken(&requested, except) {
            return requested;
        }
        let ns = requested.parent().unwrap_or_default();
        let stem = requested
            .leaf()
            .unwrap_or_default()
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .to_string();
        let mut n: u64 = 1;
        loop {
            let candidate = ns.child(format!("{stem}{n}"));
            if !self.name_taken(&candidate, except) {
                return candidate;
            }
            n += 1;
        }
    }

    /// `root` followed by all its descendants, breadth first
    fn subtree(&self, root: NodeKey) -> Vec<NodeKey> {
        let mut visited = HashSet::from([root]);
        let mut out = vec![root];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            for (k, r) in &self.nodes {
                if r.parent == Some(current) && visited.insert(k) {
                    out.push(k);
                }
            }
            i += 1;
        }
        out
    }

    fn has_contents(&self, ns: &NamePath) -> bool {
        self.namespaces.iter().any(|n| n.is_within(ns))
            || self.nodes.values().any(|r| r.name.is_within(ns))
    }

    /// Move every node and namespace inside `from` under `to`
    fn relocate(&mut self, from: &NamePath, to: &NamePath) {
        let inner: Vec<NamePath> = self
            .namespaces
            .iter()
            .filter(|n| n.is_within(from))
            .cloned()
            .collect();
        for ns in inner {
            self.namespaces.remove(&ns);
            if let Some(moved) = ns.reparent(from, to) {
                self.insert_namespace(&moved);
            }
        }

        let keys: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(_, r)| r.name.is_within(from))
            .map(|(k, _)| k)
            .collect();
        for key in keys {
            let Some(moved) = self.nodes[key].name.reparent(from, to) else {
                continue;
            };
            let moved = self.unique_name(moved, Some(key));
            self.nodes[key].name = moved;
        }
    }

    fn document_for(
        &self,
        keys: &[NodeKey],
        format: ExportFormat,
        preserve_references: bool,
    ) -> SceneDocument {
        let included: HashSet<NodeKey> = keys.iter().copied().collect();
        let mut namespaces = BTreeSet::new();
        let mut doc = SceneDocument::new(format);

        for &key in keys {
            let record = &self.nodes[key];
            if let Some(ns) = record.name.parent() {
                namespaces.extend(ns.ancestors());
                if !ns.is_empty() {
                    namespaces.insert(ns);
                }
            }
            let parent = record
                .parent
                .filter(|p| preserve_references || included.contains(p))
                .and_then(|p| self.nodes.get(p))
                .map(|p| p.id.clone());
            doc.nodes.push(NodeEntry {
                id: record.id.clone(),
                node_type: record.node_type.clone(),
                name: record.name.to_string(),
                parent,
                attributes: record.attributes.clone(),
            });
        }

        doc.namespaces = namespaces.iter().map(ToString::to_string).collect();
        doc
    }
}

fn handle_of(key: NodeKey) -> NodeHandle {
    NodeHandle::from_raw(key.data().as_ffi())
}

impl SceneGraph for MemoryScene {
    fn resolve(&self, name_or_id: &str) -> Option<NodeHandle> {
        if let Some((key, _)) = self.nodes.iter().find(|(_, r)| r.id.as_str() == name_or_id) {
            return Some(handle_of(key));
        }
        let name: NamePath = name_or_id.parse().ok()?;
        self.nodes
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(k, _)| handle_of(k))
    }

    fn identity(&self, node: NodeHandle) -> Option<NodeId> {
        self.record(node).ok().map(|r| r.id.clone())
    }

    fn node_type(&self, node: NodeHandle) -> Result<String, SceneError> {
        Ok(self.record(node)?.node_type.clone())
    }

    fn parent(&self, node: NodeHandle) -> Result<Option<NodeHandle>, SceneError> {
        Ok(self.record(node)?.parent.map(handle_of))
    }

    fn create_node(
        &mut self,
        node_type: &str,
        name: Option<&str>,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, SceneError> {
        let name = match name {
            Some(name) => Self::parse_node_name(name)?,
            None => Self::parse_node_name(&format!("{node_type}1"))?,
        };
        self.require_namespace(&name.parent().unwrap_or_default())?;
        let parent = parent.map(|p| self.key(p)).transpose()?;
        let name = self.unique_name(name, None);

        tracing::trace!(%name, node_type, "creating node");
        let key = self.insert_record(NodeId::generate(), node_type, name, parent);
        Ok(handle_of(key))
    }

    fn delete_node(&mut self, node: NodeHandle) -> Result<(), SceneError> {
        let key = self.key(node)?;
        for doomed in self.subtree(key) {
            self.nodes.remove(doomed);
        }
        let nodes = &self.nodes;
        self.selection.retain(|k| nodes.contains_key(*k));
        Ok(())
    }

    fn rename_node(&mut self, node: NodeHandle, new_name: &str) -> Result<String, SceneError> {
        let key = self.key(node)?;
        let name = Self::parse_node_name(new_name)?;
        self.require_namespace(&name.parent().unwrap_or_default())?;
        let name = self.unique_name(name, Some(key));
        let resolved = name.to_string();
        self.nodes[key].name = name;
        Ok(resolved)
    }

    fn get_name(&self, node: NodeHandle) -> Result<String, SceneError> {
        Ok(self.record(node)?.name.to_string())
    }

    fn get_namespace(&self, node: NodeHandle) -> Result<String, SceneError> {
        Ok(self.record(node)?.name.namespace())
    }

    fn namespace_exists(&self, namespace: &str) -> bool {
        namespace
            .parse::<NamePath>()
            .is_ok_and(|ns| self.has_namespace(&ns))
    }

    fn create_namespace(&mut self, namespace: &str) -> Result<(), SceneError> {
        let path: NamePath = namespace.parse()?;
        if self.has_namespace(&path) {
            return Err(SceneError::NamespaceExists(namespace.to_string()));
        }
        self.insert_namespace(&path);
        Ok(())
    }

    fn remove_namespace(
        &mut self,
        namespace: &str,
        merge_with_root: bool,
    ) -> Result<(), SceneError> {
        let path = self.existing_namespace(namespace)?;
        if self.has_contents(&path) {
            if !merge_with_root {
                return Err(SceneError::NamespaceNotEmpty(namespace.to_string()));
            }
            self.relocate(&path, &NamePath::root());
        }
        self.namespaces.remove(&path);
        Ok(())
    }

    fn move_namespace(&mut self, src: &str, dst: &str) -> Result<(), SceneError> {
        let src_path = self.existing_namespace(src)?;
        let dst_path: NamePath = dst.parse()?;
        self.require_namespace(&dst_path)?;
        if src_path == dst_path {
            return Ok(());
        }
        if dst_path.is_within(&src_path) {
            return Err(SceneError::InvalidNamespace {
                namespace: dst.to_string(),
                reason: "destination is inside the source namespace",
            });
        }
        self.relocate(&src_path, &dst_path);
        Ok(())
    }

    fn rename_namespace(
        &mut self,
        old: &str,
        new: &str,
        parent: Option<&str>,
    ) -> Result<(), SceneError> {
        let old_path = self.existing_namespace(old)?;
        let leaf = Self::parse_node_name(new)?;
        let parent_path = match parent {
            Some(parent) => {
                let path: NamePath = parent.parse()?;
                self.require_namespace(&path)?;
                path
            }
            None => NamePath::root(),
        };
        let target = NamePath::new(
            parent_path
                .segments()
                .iter()
                .chain(leaf.segments())
                .cloned()
                .collect(),
        );

        if target == old_path {
            return Ok(());
        }
        if self.namespaces.contains(&target) {
            return Err(SceneError::NamespaceExists(target.to_string()));
        }
        if target.is_within(&old_path) {
            return Err(SceneError::InvalidNamespace {
                namespace: old.to_string(),
                reason: "a namespace cannot be renamed into itself",
            });
        }

        self.insert_namespace(&target);
        self.relocate(&old_path, &target);
        self.namespaces.remove(&old_path);
        Ok(())
    }

    fn list_namespace_contents(&self, namespace: &str) -> Result<Vec<String>, SceneError> {
        let path: NamePath = namespace.parse()?;
        self.require_namespace(&path)?;

        let mut contents: Vec<String> = self
            .ordered_keys()
            .into_iter()
            .map(|k| &self.nodes[k].name)
            .filter(|name| name.parent().as_ref() == Some(&path))
            .map(ToString::to_string)
            .collect();
        contents.extend(
            self.namespaces
                .iter()
                .filter(|ns| ns.parent().as_ref() == Some(&path))
                .map(ToString::to_string),
        );
        Ok(contents)
    }

    fn has_attribute(&self, node: NodeHandle, attribute: &str) -> Result<bool, SceneError> {
        Ok(self.record(node)?.attributes.contains_key(attribute))
    }

    fn add_string_attribute(
        &mut self,
        node: NodeHandle,
        attribute: &str,
    ) -> Result<(), SceneError> {
        let record = self.record_mut(node)?;
        if record.attributes.contains_key(attribute) {
            return Err(SceneError::AttributeExists {
                node: record.name.to_string(),
                attribute: attribute.to_string(),
            });
        }
        record
            .attributes
            .insert(attribute.to_string(), String::new());
        Ok(())
    }

    fn get_attribute(&self, node: NodeHandle, attribute: &str) -> Result<String, SceneError> {
        let record = self.record(node)?;
        record
            .attributes
            .get(attribute)
            .cloned()
            .ok_or_else(|| SceneError::AttributeNotFound {
                node: record.name.to_string(),
                attribute: attribute.to_string(),
            })
    }

    fn set_attribute(
        &mut self,
        node: NodeHandle,
        attribute: &str,
        value: &str,
    ) -> Result<(), SceneError> {
        let record = self.record_mut(node)?;
        match record.attributes.get_mut(attribute) {
            Some(slot) => {
                *slot = value.to_string();
                Ok(())
            }
            None => Err(SceneError::AttributeNotFound {
                node: record.name.to_string(),
                attribute: attribute.to_string(),
            }),
        }
    }

    fn select(&mut self, node: NodeHandle) -> Result<(), SceneError> {
        let key = self.key(node)?;
        self.selection = vec![key];
        Ok(())
    }

    fn selection(&self) -> Vec<NodeHandle> {
        self.selection.iter().copied().map(handle_of).collect()
    }

    fn set_selection(&mut self, nodes: &[NodeHandle]) -> Result<(), SceneError> {
        let mut selection = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if let Ok(key) = self.key(node) {
                if !selection.contains(&key) {
                    selection.push(key);
                }
            }
        }
        self.selection = selection;
        Ok(())
    }

    fn export_selected(
        &mut self,
        path: &Path,
        options: &ExportOptions,
    ) -> Result<(), SceneError> {
        if self.selection.is_empty() {
            return Err(SceneError::NothingSelected);
        }

        let mut keys: Vec<NodeKey> = Vec::new();
        for &selected in &self.selection {
            let group = if options.include_descendants {
                self.subtree(selected)
            } else {
                vec![selected]
            };
            for key in group {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        let doc = self.document_for(&keys, options.format, options.preserve_references);
        doc.write(path)?;
        tracing::debug!(path = %path.display(), nodes = keys.len(), "exported selection");
        Ok(())
    }
}
