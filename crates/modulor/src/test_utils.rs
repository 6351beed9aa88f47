//! Test utilities: an in-memory runtime and descriptor helpers.
//!
//! Only compiled for tests and with the `test-utils` feature.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap as HashMap;

use crate::file::{ContentKind, FileDescriptor};
use crate::runtime::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// In-memory file table that counts reads per path.
///
/// Read counts make memoization observable: a module parsed once is read
/// exactly once no matter how many requesters reach it.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    cwd: PathBuf,
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    reads: Mutex<HashMap<PathBuf, usize>>,
}

impl MemoryRuntime {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Self::default()
        }
    }

    /// Add a file relative to the working directory.
    pub fn with_file(self, name: &str, contents: impl AsRef<[u8]>) -> Self {
        self.insert(self.cwd.join(name), contents);
        self
    }

    /// Store raw bytes, so sources need not be valid UTF-8.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) {
        self.files
            .write()
            .insert(path.into(), contents.as_ref().to_vec());
    }

    /// Number of times `path` was read.
    pub fn read_count(&self, path: &Path) -> usize {
        self.reads.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.reads.lock().values().sum()
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        *self.reads.lock().entry(path.to_path_buf()).or_default() += 1;
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let files = self.files.read();
        if let Some(contents) = files.get(path) {
            return Ok(FileMetadata {
                size: contents.len() as u64,
                is_dir: false,
                is_file: true,
            });
        }
        if files.keys().any(|file| file.starts_with(path)) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
            });
        }
        Err(RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}

/// Script descriptors for `scripts`, each linked from the entry document
/// `document`, all under `root`.
pub fn entry_scripts(root: &Path, document: &str, scripts: &[&str]) -> Vec<FileDescriptor> {
    let markup = FileDescriptor::new(root, document, ContentKind::Markup);
    scripts
        .iter()
        .map(|script| {
            FileDescriptor::new(root, *script, ContentKind::Script).with_parent(markup.clone())
        })
        .collect()
}
