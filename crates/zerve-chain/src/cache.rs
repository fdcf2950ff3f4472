use std::collections::BTreeMap;

use tracing::debug;
use zerve_store::{Block, BlockStore, StoreResult};
use zerve_types::BlockId;

/// Blocks extracted during evaluation, waiting to be persisted.
///
/// Extraction only fills the cache; [`persist`](BlockCache::persist) writes
/// the collected blocks to a store in a separate step. Re-inserting the same
/// content is a no-op because the id is the content.
#[derive(Clone, Debug, Default)]
pub struct BlockCache {
    blocks: BTreeMap<BlockId, Block>,
}

impl BlockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block. Returns `false` if it was already cached.
    pub fn insert(&mut self, block: Block) -> bool {
        if self.blocks.contains_key(&block.id) {
            return false;
        }
        self.blocks.insert(block.id, block);
        true
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &BlockId> {
        self.blocks.keys()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Write every cached block to `store`. Returns how many were written.
    pub async fn persist(&self, store: &dyn BlockStore) -> StoreResult<usize> {
        for block in self.blocks.values() {
            store.put_block(block).await?;
        }
        if !self.blocks.is_empty() {
            debug!(count = self.blocks.len(), "extracted blocks persisted");
        }
        Ok(self.blocks.len())
    }
}
