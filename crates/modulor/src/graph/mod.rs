//! File graph: an arena of file nodes with owned forward edges and
//! non-owning back references.
//!
//! Nodes are addressed by [`FileId`], a stable index into the arena. Forward
//! edges (dependencies) and back references (parents) live in two separate
//! edge tables, so cyclic module graphs never turn into reference cycles and
//! the whole structure can be shared across collector tasks behind a single
//! lock.

mod statistics;
mod store;
mod traversal;

pub use statistics::GraphStatistics;
pub use store::{Discovery, FileGraph, NewNode};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::LoaderConfig;
use crate::detector::PluginKind;
use crate::file::ContentKind;

/// Stable identity of a node inside a [`FileGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileId(pub(crate) u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node progress through the collector's state machine.
///
/// Ordering matters: later states compare greater, which lets waiters ask
/// "has this node been parsed yet?" with a single comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NodeState {
    Discovered,
    Reading,
    Parsed,
    ResolvingDirect,
    ResolvingNested,
    ResolvingPlugins,
    Settled,
}

impl NodeState {
    pub fn is_settled(self) -> bool {
        self == NodeState::Settled
    }
}

/// Plugin role flags for a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PluginFlags {
    /// Referenced as the `plugin` half of a `plugin!resource` identifier.
    pub is_plugin: bool,
    /// Referenced as a plugin and classified as a load-time loader.
    pub is_loader_plugin: bool,
}

/// A single file in the graph.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub id: FileId,
    /// Canonical absolute path (registry identity).
    pub path: PathBuf,
    /// Logical module name as seen by requesters.
    pub name: String,
    /// Root base directory the file was discovered under.
    pub root: PathBuf,
    pub kind: ContentKind,
    /// Extra identities declared through named `define` calls.
    pub declared_names: Vec<String>,
    pub plugin: PluginFlags,
    pub plugin_kind: PluginKind,
    pub state: NodeState,
    /// Run-wide configuration, attached to the one file it was found in.
    pub configuration: Option<Arc<LoaderConfig>>,
}

impl FileNode {
    pub fn is_script(&self) -> bool {
        self.kind.is_script()
    }

    pub fn is_markup(&self) -> bool {
        self.kind.is_markup()
    }

    /// Directory containing this file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Module id declared by a named `define`, if any.
    ///
    /// Relative identifiers inside a named module are joined against this
    /// id rather than against the file's location.
    pub fn declared_id(&self) -> Option<&str> {
        self.declared_names.first().map(String::as_str)
    }
}
