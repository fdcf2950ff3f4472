use serde_json::Value;
use zerve_crypto::ContentHasher;
use zerve_types::{BlockId, BlockRef};

use crate::error::{StoreError, StoreResult};

/// An immutable, content-addressed JSON value.
///
/// `Block` is the unit of storage. It carries the canonical bytes that were
/// hashed so backends persist exactly what the id commits to.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub content: Value,
    bytes: Vec<u8>,
}

impl Block {
    /// Canonicalize and address a value.
    pub fn new(content: Value) -> StoreResult<Self> {
        let (id, bytes) = ContentHasher::BLOCK.hash_json(&content)?;
        Ok(Self { id, content, bytes })
    }

    /// Decode stored bytes, checking they still hash to `id`.
    pub fn decode(id: BlockId, bytes: Vec<u8>) -> StoreResult<Self> {
        let computed = ContentHasher::BLOCK.hash(&bytes);
        if computed != id {
            return Err(StoreError::HashMismatch { id, computed });
        }
        let content = serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptBlock {
            id,
            reason: e.to_string(),
        })?;
        Ok(Self { id, content, bytes })
    }

    /// The canonical serialized form.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the canonical form in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn block_ref(&self) -> BlockRef {
        BlockRef::new(self.id)
    }
}
