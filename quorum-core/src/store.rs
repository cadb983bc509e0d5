//! File store abstractions
//!
//! The synthesizer never touches the filesystem directly. Reads and writes go
//! through [`ConfigStore`] so a node's files can live on local disk, inside a
//! container, or in memory for tests.

use crate::error::{QuorumError, QuorumResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Read/write boundary for node configuration files
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a file. A missing file is `Ok(None)`, not an error.
    async fn pull(&self, path: &Path) -> QuorumResult<Option<String>>;

    /// Replace a file's contents, creating parent directories as needed
    async fn push(&self, path: &Path, content: &str) -> QuorumResult<()>;
}

/// Store backed by the local filesystem
#[derive(Debug, Default, Clone)]
pub struct TokioConfigStore;

impl TokioConfigStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConfigStore for TokioConfigStore {
    async fn pull(&self, path: &Path) -> QuorumResult<Option<String>> {
        debug!("Reading {:?}", path);
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(QuorumError::Io(e)),
        }
    }

    async fn push(&self, path: &Path, content: &str) -> QuorumResult<()> {
        debug!("Writing {:?}", path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| QuorumError::Configuration {
                    component: "directory_creation".to_string(),
                    message: format!("Failed to create {:?}: {}", parent, e),
                })?;
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// In-memory store for tests
#[derive(Debug, Default, Clone)]
pub struct MockConfigStore {
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
    unreadable: Arc<RwLock<HashSet<PathBuf>>>,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.write().await.insert(path.into(), content.into());
    }

    /// Make every later `pull` of `path` fail with a permission error
    pub async fn make_unreadable(&self, path: impl Into<PathBuf>) {
        self.unreadable.write().await.insert(path.into());
    }

    pub async fn contents(&self, path: &Path) -> Option<String> {
        self.files.read().await.get(path).cloned()
    }

    pub async fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self
            .files
            .read()
            .await
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    async fn pull(&self, path: &Path) -> QuorumResult<Option<String>> {
        if self.unreadable.read().await.contains(path) {
            return Err(QuorumError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )));
        }
        Ok(self.files.read().await.get(path).cloned())
    }

    async fn push(&self, path: &Path, content: &str) -> QuorumResult<()> {
        self.files
            .write()
            .await
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}
