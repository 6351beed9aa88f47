//! Core FileGraph structure, registry and mutations.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use super::{FileId, FileNode, NodeState, PluginFlags};
use crate::config::LoaderConfig;
use crate::detector::PluginKind;
use crate::file::ContentKind;

/// Shared, lock-protected file graph.
///
/// Cloning is cheap and every clone sees the same registry. The registry
/// check-then-insert in [`FileGraph::discover`] runs under one write lock,
/// so concurrent discovery of the same module collapses to a single node.
#[derive(Debug, Clone, Default)]
pub struct FileGraph {
    pub(super) inner: Arc<RwLock<GraphInner>>,
}

#[derive(Debug, Default)]
pub(super) struct GraphInner {
    /// Node arena, indexed by `FileId`. Insertion order is discovery order.
    pub nodes: Vec<FileNode>,
    /// Registry: canonical path -> node.
    pub by_path: HashMap<PathBuf, FileId>,
    /// Additional identities from named `define` calls.
    pub by_name: HashMap<String, FileId>,
    /// Forward edges: node -> its dependencies, in discovery order.
    pub dependencies: Vec<Vec<FileId>>,
    /// Back references: node -> nodes that depend on it, in discovery order.
    pub parents: Vec<Vec<FileId>>,
}

impl GraphInner {
    fn link(&mut self, parent: FileId, child: FileId) -> bool {
        if parent == child {
            return false;
        }
        let deps = &mut self.dependencies[parent.index()];
        if deps.contains(&child) {
            return false;
        }
        deps.push(child);
        let parents = &mut self.parents[child.index()];
        if !parents.contains(&parent) {
            parents.push(parent);
        }
        true
    }
}

/// Data required to register a node the first time it is seen.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub path: PathBuf,
    pub name: String,
    pub root: PathBuf,
    pub kind: ContentKind,
}

/// Outcome of a registry lookup-or-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// First discoverer: the caller owns reading and parsing this node.
    Inserted(FileId),
    /// Already registered: the parent was merged, nothing else to do.
    Existing(FileId),
    /// The registry is full; no node was created.
    Rejected,
}

impl Discovery {
    pub fn id(self) -> Option<FileId> {
        match self {
            Discovery::Inserted(id) | Discovery::Existing(id) => Some(id),
            Discovery::Rejected => None,
        }
    }
}

impl FileGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by canonical path, inserting it if absent, and record
    /// `parent` as a requester of the node in both edge tables.
    ///
    /// `max_nodes` bounds the registry size; a full registry still merges
    /// parents into existing nodes but refuses new ones.
    pub fn discover(&self, node: NewNode, parent: Option<FileId>, max_nodes: usize) -> Discovery {
        let mut inner = self.inner.write();

        if let Some(&id) = inner.by_path.get(&node.path) {
            if let Some(parent) = parent {
                inner.link(parent, id);
            }
            return Discovery::Existing(id);
        }

        if inner.nodes.len() >= max_nodes {
            return Discovery::Rejected;
        }

        let id = FileId(inner.nodes.len() as u32);
        inner.by_path.insert(node.path.clone(), id);
        inner.nodes.push(FileNode {
            id,
            path: node.path,
            name: node.name,
            root: node.root,
            kind: node.kind,
            declared_names: Vec::new(),
            plugin: PluginFlags::default(),
            plugin_kind: PluginKind::None,
            state: NodeState::Discovered,
            configuration: None,
        });
        inner.dependencies.push(Vec::new());
        inner.parents.push(Vec::new());
        if let Some(parent) = parent {
            inner.link(parent, id);
        }
        Discovery::Inserted(id)
    }

    /// Merge an already-registered node under `parent`.
    ///
    /// Returns false when the edge already existed.
    pub fn link(&self, parent: FileId, child: FileId) -> bool {
        self.inner.write().link(parent, child)
    }

    /// Register a named-module identity for `id`. First registration wins.
    pub fn declare_name(&self, name: &str, id: FileId) -> bool {
        let mut inner = self.inner.write();
        if inner.by_name.contains_key(name) {
            return false;
        }
        inner.by_name.insert(name.to_string(), id);
        let node = &mut inner.nodes[id.index()];
        if !node.declared_names.iter().any(|n| n == name) {
            node.declared_names.push(name.to_string());
        }
        true
    }

    pub fn lookup_name(&self, name: &str) -> Option<FileId> {
        self.inner.read().by_name.get(name).copied()
    }

    pub fn set_state(&self, id: FileId, state: NodeState) {
        self.inner.write().nodes[id.index()].state = state;
    }

    pub fn state(&self, id: FileId) -> Option<NodeState> {
        self.inner.read().nodes.get(id.index()).map(|n| n.state)
    }

    pub fn set_plugin_kind(&self, id: FileId, kind: PluginKind) {
        let mut inner = self.inner.write();
        let node = &mut inner.nodes[id.index()];
        node.plugin_kind = kind;
        node.plugin.is_loader_plugin = node.plugin.is_plugin && kind == PluginKind::Loader;
    }

    /// Flag a node as referenced through `plugin!resource`.
    pub fn mark_plugin(&self, id: FileId) {
        let mut inner = self.inner.write();
        let node = &mut inner.nodes[id.index()];
        node.plugin.is_plugin = true;
        node.plugin.is_loader_plugin = node.plugin_kind == PluginKind::Loader;
    }

    pub fn attach_configuration(&self, id: FileId, config: Arc<LoaderConfig>) {
        self.inner.write().nodes[id.index()].configuration = Some(config);
    }

    pub fn node(&self, id: FileId) -> Option<FileNode> {
        self.inner.read().nodes.get(id.index()).cloned()
    }

    /// All nodes in discovery order.
    pub fn nodes(&self) -> Vec<FileNode> {
        self.inner.read().nodes.clone()
    }

    pub fn parents(&self, id: FileId) -> Vec<FileId> {
        self.inner
            .read()
            .parents
            .get(id.index())
            .cloned()
            .unwrap_or_default()
    }

    pub fn dependencies(&self, id: FileId) -> Vec<FileId> {
        self.inner
            .read()
            .dependencies
            .get(id.index())
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
