use serde_json::Value;
use zerve_types::BlockId;

use crate::canonical::canonical_json;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"zerve-block-v1"`) that is
/// prepended to every hash computation, so ids minted for different purposes
/// can never collide even over identical bytes.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for stored blocks.
    pub const BLOCK: Self = Self {
        domain: "zerve-block-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> BlockId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        BlockId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Canonicalize a JSON value and hash it. Returns the id together with
    /// the canonical bytes so callers can persist exactly what was hashed.
    pub fn hash_json(&self, value: &Value) -> Result<(BlockId, Vec<u8>), serde_json::Error> {
        let bytes = canonical_json(value)?;
        Ok((self.hash(&bytes), bytes))
    }

    /// Verify that data produces the expected id.
    pub fn verify(&self, data: &[u8], expected: &BlockId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
