//! Native filesystem runtime.

// NativeRuntime is the one place allowed to wrap std::fs
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::task;

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// [`Runtime`] backed by the OS filesystem.
///
/// Blocking `std::fs` calls run on tokio's blocking pool so that a large
/// fan-out of reads never stalls the async workers driving the collector.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn io_error(path: &Path, e: std::io::Error, action: &str) -> RuntimeError {
    if e.kind() == std::io::ErrorKind::NotFound {
        RuntimeError::FileNotFound(path.to_path_buf())
    } else {
        RuntimeError::Io(format!("Failed to {} {}: {}", action, path.display(), e))
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = path.to_path_buf();

        task::spawn_blocking(move || std::fs::read(&path).map_err(|e| io_error(&path, e, "read")))
            .await
            .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let path = path.to_path_buf();

        task::spawn_blocking(move || {
            let metadata =
                std::fs::metadata(&path).map_err(|e| io_error(&path, e, "get metadata for"))?;
            Ok(FileMetadata {
                size: metadata.len(),
                is_dir: metadata.is_dir(),
                is_file: metadata.is_file(),
            })
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(|e| {
            RuntimeError::Io(format!("Failed to get current working directory: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("main.js");
        fs::write(&file_path, b"define([], function () {});").unwrap();

        let runtime = NativeRuntime::new();
        let content = runtime.read_file(&file_path).await.unwrap();
        assert_eq!(content, b"define([], function () {});");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.js");

        let runtime = NativeRuntime::new();
        let err = runtime.read_file(&missing).await.unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(p) if p == missing));
    }

    #[tokio::test]
    async fn test_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a.js");
        fs::write(&file_path, b"12345").unwrap();

        let runtime = NativeRuntime::new();
        let metadata = runtime.metadata(&file_path).await.unwrap();
        assert_eq!(metadata.size, 5);
        assert!(metadata.is_file);
        assert!(!metadata.is_dir);
        assert!(runtime.exists(&file_path));
    }
}
