//! Soft deletion.
//!
//! Deleted docs and blocks are never erased. Their files are renamed into the
//! trash directory under a key namespaced by kind, so a doc and a block can
//! never collide.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use zerve_types::BlockId;

use crate::error::{StoreError, StoreResult};
use crate::fsutil::list_visible;

/// Namespaced name of a trashed file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrashKey {
    Doc(String),
    Block(BlockId),
}

impl fmt::Display for TrashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doc(name) => write!(f, "doc-{name}"),
            Self::Block(id) => write!(f, "block-{id}"),
        }
    }
}

/// Directory of soft-deleted files.
#[derive(Clone, Debug)]
pub struct TrashStore {
    dir: PathBuf,
}

impl TrashStore {
    /// Open the trash directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, key: &TrashKey) -> PathBuf {
        self.dir.join(key.to_string())
    }

    /// Rename `source` into the trash. A previously trashed file with the same
    /// key is replaced. The io error is returned unchanged so callers can map
    /// `NotFound` to their own error.
    pub async fn discard(&self, source: &Path, key: &TrashKey) -> io::Result<()> {
        fs::rename(source, self.path_of(key)).await?;
        debug!(key = %key, "moved to trash");
        Ok(())
    }

    /// Raw bytes of a trashed file.
    pub async fn read(&self, key: &TrashKey) -> StoreResult<Vec<u8>> {
        match fs::read(self.path_of(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::TrashNotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All trash keys, sorted.
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        Ok(list_visible(&self.dir).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(TrashKey::Doc("notes".into()).to_string(), "doc-notes");
        let id = BlockId::from_hash([0xff; 32]);
        assert_eq!(TrashKey::Block(id).to_string(), format!("block-{}", "ff".repeat(32)));
    }

    #[tokio::test]
    async fn discard_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let trash = TrashStore::open(dir.path().join("trash")).await.unwrap();
        let source = dir.path().join("notes");
        fs::write(&source, b"{\"a\":1}").await.unwrap();

        let key = TrashKey::Doc("notes".into());
        trash.discard(&source, &key).await.unwrap();

        assert!(!source.exists());
        assert_eq!(trash.read(&key).await.unwrap(), b"{\"a\":1}");
        assert_eq!(trash.list().await.unwrap(), vec!["doc-notes"]);
    }

    #[tokio::test]
    async fn discard_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let trash = TrashStore::open(dir.path().join("trash")).await.unwrap();
        let err = trash
            .discard(&dir.path().join("missing"), &TrashKey::Doc("missing".into()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn read_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let trash = TrashStore::open(dir.path()).await.unwrap();
        let err = trash.read(&TrashKey::Doc("nope".into())).await.unwrap_err();
        assert!(matches!(err, StoreError::TrashNotFound(k) if k == "doc-nope"));
    }
}
