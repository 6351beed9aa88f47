//! File descriptors produced by the traversal and entry-discovery stage.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};

/// Kind of content a file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// An entry document (HTML) that links scripts.
    Markup,
    /// A JavaScript source.
    Script,
}

impl ContentKind {
    /// Infer the kind from a file extension, as the walker stage does.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "html" | "htm" => Some(Self::Markup),
            "js" => Some(Self::Script),
            _ => None,
        }
    }

    pub fn is_script(self) -> bool {
        self == Self::Script
    }

    pub fn is_markup(self) -> bool {
        self == Self::Markup
    }
}

/// A file handed to the core by the external traversal stage.
///
/// Scripts linked from an entry document carry that document in `parents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Project root the file was discovered under.
    pub root: PathBuf,
    /// Logical name as seen by requesters (usually root-relative).
    pub name: String,
    /// Absolute path on disk.
    pub full_path: PathBuf,
    pub kind: ContentKind,
    #[serde(default)]
    pub parents: Vec<FileDescriptor>,
}

impl FileDescriptor {
    /// Describe a file of the given kind living at `root/name`.
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, kind: ContentKind) -> Self {
        let root = root.into();
        let name = name.into();
        let full_path = root.join(&name).clean();
        Self {
            root,
            name,
            full_path,
            kind,
            parents: Vec::new(),
        }
    }

    /// Describe an entry document.
    pub fn markup(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(root, name, ContentKind::Markup)
    }

    /// Describe a script.
    pub fn script(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(root, name, ContentKind::Script)
    }

    /// Attach a parent (typically the entry document linking this script).
    pub fn with_parent(mut self, parent: FileDescriptor) -> Self {
        self.parents.push(parent);
        self
    }
}
