//! Blob storage for uploaded ticket images.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;

use super::store::StoreResult;

/// Read access to uploaded files.
pub trait BlobStore: Send + Sync {
    /// Download the full contents stored under `path`.
    fn download(&self, path: &str) -> StoreResult<Vec<u8>>;
}

/// Blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(StoreError::Backend(format!("blob path escapes store root: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn download(&self, path: &str) -> StoreResult<Vec<u8>> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(std::fs::read(full)?)
    }
}

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `path`, replacing any previous contents.
    pub fn put(&self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(path.into(), data.into());
        }
    }
}

impl BlobStore for MemoryBlobStore {
    fn download(&self, path: &str) -> StoreResult<Vec<u8>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| StoreError::Backend("blob lock poisoned".to_string()))?;
        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}
