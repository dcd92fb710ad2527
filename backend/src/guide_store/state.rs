//! Shared, in-process copy of the configured guide.
//!
//! `GuideStore` is created once in `main.rs` and cloned into every handler. Reads
//! come from the cached value and never touch the disk. Writes go through
//! `replace`, which holds the write lock across "persist, then update cache" so two
//! admins setting the guide at the same time cannot interleave.

use super::{file, StoreError};
use common::model::guide::Guide;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct GuideStore {
    path: Arc<PathBuf>,
    current: Arc<RwLock<Guide>>,
}

impl GuideStore {
    /// Loads the guide from `path` once and caches it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let guide = file::load(&path);
        GuideStore {
            path: Arc::new(path),
            current: Arc::new(RwLock::new(guide)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the cached guide.
    pub async fn current(&self) -> Guide {
        self.current.read().await.clone()
    }

    /// Persists `guide` and makes it the current one.
    ///
    /// If the file cannot be written the cached guide stays as it was, so the
    /// running process never serves something that would be lost on restart.
    /// The file write runs on the blocking pool with the write lock held.
    pub async fn replace(&self, guide: Guide) -> Result<(), StoreError> {
        let mut current = self.current.write().await;
        let path = Arc::clone(&self.path);
        let record = guide.clone();
        tokio::task::spawn_blocking(move || file::save(&path, &record)).await??;
        *current = guide;
        Ok(())
    }
}
