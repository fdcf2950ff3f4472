//! File-backed doc store.
//!
//! Each doc lives at `docs/<name>` as plain JSON. Writes go through an atomic
//! temp-file rename, and every mutation of a name holds that name's async
//! lock, which is what makes [`compare_and_swap`](DocStore::compare_and_swap)
//! atomic within a process.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};
use zerve_store::fsutil::{list_visible, write_atomic};
use zerve_store::{TrashKey, TrashStore};

use crate::error::{DocError, Result};
use crate::names::validate_doc_name;
use crate::traits::DocStore;

/// Doc store backed by one file per doc.
#[derive(Debug)]
pub struct FsDocStore {
    dir: PathBuf,
    trash: TrashStore,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl FsDocStore {
    /// Open the docs directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>, trash: TrashStore) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "doc store opened");
        Ok(Self {
            dir,
            trash,
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn trash(&self) -> &TrashStore {
        &self.trash
    }

    fn doc_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Acquire the write lock for one doc name.
    async fn lock_name(&self, name: &str) -> Result<NameLock<'_>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|e| DocError::Poisoned(e.to_string()))?;
            Arc::clone(locks.entry(name.to_string()).or_default())
        };
        Ok(NameLock {
            locks: &self.locks,
            name: name.to_string(),
            guard: Some(lock.lock_owned().await),
        })
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }

    async fn read_value(&self, name: &str) -> Result<Option<Value>> {
        let bytes = match fs::read(self.doc_path(name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| DocError::Serialization {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    async fn write_value(&self, name: &str, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| DocError::Serialization {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        write_atomic(&self.doc_path(name), &bytes).await?;
        Ok(())
    }
}

/// Held write lock for one doc name. Dropping it releases the lock and
/// forgets the name once no other task holds or waits on it.
struct NameLock<'a> {
    locks: &'a Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    name: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for NameLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        if let Ok(mut locks) = self.locks.lock() {
            if locks
                .get(&self.name)
                .is_some_and(|lock| Arc::strong_count(lock) == 1)
            {
                locks.remove(&self.name);
            }
        }
    }
}

#[async_trait]
impl DocStore for FsDocStore {
    async fn get_doc(&self, name: &str) -> Result<Option<Value>> {
        validate_doc_name(name)?;
        self.read_value(name).await
    }

    async fn set_doc(&self, name: &str, value: &Value) -> Result<()> {
        validate_doc_name(name)?;
        let _guard = self.lock_name(name).await?;
        self.write_value(name, value).await?;
        debug!(doc = name, "doc set");
        Ok(())
    }

    async fn delete_doc(&self, name: &str) -> Result<()> {
        validate_doc_name(name)?;
        let _guard = self.lock_name(name).await?;
        match self
            .trash
            .discard(&self.doc_path(name), &TrashKey::Doc(name.to_string()))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DocError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_docs(&self) -> Result<Vec<String>> {
        Ok(list_visible(&self.dir).await?)
    }

    async fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<&Value>,
        new: &Value,
    ) -> Result<bool> {
        validate_doc_name(name)?;
        let _guard = self.lock_name(name).await?;
        let current = self.read_value(name).await?;
        if current.as_ref() != expected {
            debug!(doc = name, "compare-and-swap lost: value changed");
            return Ok(false);
        }
        self.write_value(name, new).await?;
        debug!(doc = name, "compare-and-swap applied");
        Ok(true)
    }
}
