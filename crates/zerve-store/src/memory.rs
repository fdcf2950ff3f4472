use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use zerve_types::{BlockId, BlockRef};

use crate::block::Block;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;
use crate::trash::TrashKey;

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks are held as canonical bytes behind
/// a `RwLock`; deleted blocks move to an in-memory trash map.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<BlockId, Vec<u8>>>,
    trash: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
            trash: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_blocks()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_blocks()?.is_empty())
    }

    /// Raw bytes of a trashed entry.
    pub fn trashed(&self, key: &TrashKey) -> StoreResult<Option<Vec<u8>>> {
        let trash = self
            .trash
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(trash.get(&key.to_string()).cloned())
    }

    fn read_blocks(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<BlockId, Vec<u8>>>> {
        self.blocks
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write_blocks(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<BlockId, Vec<u8>>>> {
        self.blocks
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn put_block(&self, block: &Block) -> StoreResult<BlockRef> {
        let mut map = self.write_blocks()?;
        match map.get(&block.id) {
            Some(existing) if existing.as_slice() == block.bytes() => {}
            Some(existing) => {
                return Err(StoreError::IntegrityViolation {
                    id: block.id,
                    stored_len: existing.len(),
                    expected_len: block.size(),
                })
            }
            None => {
                map.insert(block.id, block.bytes().to_vec());
            }
        }
        Ok(block.block_ref())
    }

    async fn get_block(&self, id: &BlockId) -> StoreResult<Value> {
        let bytes = self
            .read_blocks()?
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))?;
        Ok(Block::decode(*id, bytes)?.content)
    }

    async fn has_block(&self, id: &BlockId) -> StoreResult<bool> {
        Ok(self.read_blocks()?.contains_key(id))
    }

    async fn delete_block(&self, id: &BlockId) -> StoreResult<()> {
        let bytes = self
            .write_blocks()?
            .remove(id)
            .ok_or(StoreError::NotFound(*id))?;
        self.trash
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?
            .insert(TrashKey::Block(*id).to_string(), bytes);
        Ok(())
    }

    async fn list_blocks(&self) -> StoreResult<Vec<BlockId>> {
        let mut ids: Vec<BlockId> = self.read_blocks()?.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.blocks.read().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &count)
            .finish()
    }
}
