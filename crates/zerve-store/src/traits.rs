use async_trait::async_trait;
use serde_json::Value;
use zerve_types::{BlockId, BlockRef};

use crate::block::Block;
use crate::error::StoreResult;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written. The same content always produces the
///   same id.
/// - Writing an id that already exists succeeds only if the stored bytes are
///   identical; otherwise it fails with `IntegrityViolation` and leaves the
///   stored block untouched.
/// - Deletion is soft: the block moves to the trash under `block-<id>`.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Persist a prepared block and return a reference to it.
    async fn put_block(&self, block: &Block) -> StoreResult<BlockRef>;

    /// Read a block's content. Fails with `NotFound` if absent.
    async fn get_block(&self, id: &BlockId) -> StoreResult<Value>;

    /// Check whether a block exists.
    async fn has_block(&self, id: &BlockId) -> StoreResult<bool>;

    /// Move a block to the trash. Fails with `NotFound` if absent.
    async fn delete_block(&self, id: &BlockId) -> StoreResult<()>;

    /// All stored block ids, sorted.
    async fn list_blocks(&self) -> StoreResult<Vec<BlockId>>;

    /// Canonicalize, address, and persist a value.
    async fn create_block(&self, content: Value) -> StoreResult<BlockRef> {
        self.put_block(&Block::new(content)?).await
    }
}
