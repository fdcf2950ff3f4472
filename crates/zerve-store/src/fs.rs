use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error, info};
use zerve_types::{BlockId, BlockRef};

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::fsutil::{list_visible, write_atomic};
use crate::traits::BlockStore;
use crate::trash::{TrashKey, TrashStore};

/// Filesystem block store: one file per block, named by its hex id, holding
/// the block's canonical JSON bytes.
#[derive(Clone, Debug)]
pub struct FsBlockStore {
    dir: PathBuf,
    trash: TrashStore,
}

impl FsBlockStore {
    /// Open the block directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>, trash: TrashStore) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "block store opened");
        Ok(Self { dir, trash })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn trash(&self) -> &TrashStore {
        &self.trash
    }

    fn block_path(&self, id: &BlockId) -> PathBuf {
        self.dir.join(id.to_hex())
    }
}

#[async_trait]
impl BlockStore for FsBlockStore {
    async fn put_block(&self, block: &Block) -> StoreResult<BlockRef> {
        let path = self.block_path(&block.id);
        match fs::read(&path).await {
            Ok(existing) if existing == block.bytes() => {
                debug!(id = %block.id.short_hex(), "block already stored");
                return Ok(block.block_ref());
            }
            Ok(existing) => {
                error!(
                    id = %block.id,
                    stored_len = existing.len(),
                    expected_len = block.size(),
                    "persisted block does not match its id"
                );
                return Err(StoreError::IntegrityViolation {
                    id: block.id,
                    stored_len: existing.len(),
                    expected_len: block.size(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // A concurrent writer of the same id renames identical bytes into
        // place, so losing that race is harmless.
        write_atomic(&path, block.bytes()).await?;
        debug!(id = %block.id.short_hex(), size = block.size(), "block written");
        Ok(block.block_ref())
    }

    async fn get_block(&self, id: &BlockId) -> StoreResult<Value> {
        let bytes = match fs::read(self.block_path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Block::decode(*id, bytes)?.content)
    }

    async fn has_block(&self, id: &BlockId) -> StoreResult<bool> {
        Ok(fs::try_exists(self.block_path(id)).await?)
    }

    async fn delete_block(&self, id: &BlockId) -> StoreResult<()> {
        match self
            .trash
            .discard(&self.block_path(id), &TrashKey::Block(*id))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_blocks(&self) -> StoreResult<Vec<BlockId>> {
        let mut ids = Vec::new();
        for name in list_visible(&self.dir).await? {
            match name.parse::<BlockId>() {
                Ok(id) => ids.push(id),
                Err(_) => debug!(name = %name, "skipping non-block file"),
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    async fn open_store(root: &Path) -> FsBlockStore {
        let trash = TrashStore::open(root.join("trash")).await.unwrap();
        FsBlockStore::open(root.join("blocks"), trash).await.unwrap()
    }

    #[tokio::test]
    async fn create_and_get_block() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        let value = json!({"title": "hello", "tags": ["a", "b"]});
        let block_ref = store.create_block(value.clone()).await.unwrap();
        assert_eq!(store.get_block(&block_ref.id).await.unwrap(), value);
        assert!(store.has_block(&block_ref.id).await.unwrap());
    }

    #[tokio::test]
    async fn file_is_named_by_hash_and_holds_canonical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        let block_ref = store.create_block(json!({"b": 2, "a": 1})).await.unwrap();
        let path = dir.path().join("blocks").join(block_ref.id.to_hex());
        assert_eq!(fs::read(&path).await.unwrap(), br#"{"a":1,"b":2}"#);
    }

    #[tokio::test]
    async fn create_is_idempotent_and_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        let first = store.create_block(json!([1, 2, 3])).await.unwrap();
        let path = dir.path().join("blocks").join(first.id.to_hex());
        let before = fs::metadata(&path).await.unwrap().modified().unwrap();

        let second = store.create_block(json!([1, 2, 3])).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::metadata(&path).await.unwrap().modified().unwrap(), before);
        assert_eq!(fs::read(&path).await.unwrap(), b"[1,2,3]");
        assert_eq!(store.list_blocks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_length_tampering_is_an_integrity_violation() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        let block_ref = store.create_block(json!("abc")).await.unwrap();
        let path = dir.path().join("blocks").join(block_ref.id.to_hex());
        fs::write(&path, b"\"xyz\"").await.unwrap();

        let err = store.create_block(json!("abc")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::IntegrityViolation { stored_len: 5, expected_len: 5, .. }
        ));
        // The tampered file is left for inspection, not overwritten.
        assert_eq!(fs::read(&path).await.unwrap(), b"\"xyz\"");
    }

    #[tokio::test]
    async fn get_detects_tampered_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        let block_ref = store.create_block(json!(1)).await.unwrap();
        let path = dir.path().join("blocks").join(block_ref.id.to_hex());
        fs::write(&path, b"2").await.unwrap();

        let err = store.get_block(&block_ref.id).await.unwrap_err();
        assert!(matches!(err, StoreError::HashMismatch { .. }));
    }

    #[tokio::test]
    async fn get_missing_block_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;
        let id = BlockId::from_bytes(b"missing");
        assert!(matches!(
            store.get_block(&id).await,
            Err(StoreError::NotFound(missing)) if missing == id
        ));
        assert!(!store.has_block(&id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_moves_block_to_trash() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        let block_ref = store.create_block(json!({"keep": "me"})).await.unwrap();
        store.delete_block(&block_ref.id).await.unwrap();

        assert!(!store.has_block(&block_ref.id).await.unwrap());
        let trashed = store
            .trash()
            .read(&TrashKey::Block(block_ref.id))
            .await
            .unwrap();
        assert_eq!(trashed, br#"{"keep":"me"}"#);

        assert!(matches!(
            store.delete_block(&block_ref.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_skips_hidden_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        let a = store.create_block(json!("a")).await.unwrap();
        let b = store.create_block(json!("b")).await.unwrap();
        fs::write(store.dir().join(".DS_Store"), b"").await.unwrap();
        fs::write(store.dir().join("README"), b"").await.unwrap();

        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(store.list_blocks().await.unwrap(), expected);
    }
}
