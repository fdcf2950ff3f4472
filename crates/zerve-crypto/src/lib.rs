//! Content hashing for the Zerve data engine.
//!
//! A block's id is the domain-separated BLAKE3 hash of the block's canonical
//! JSON serialization (JCS, RFC 8785). Canonical form sorts object keys at
//! every depth, drops insignificant whitespace, and writes numbers the way
//! ECMAScript does, so two JSON values that differ only in key order or in
//! number spelling always address the same block.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod canonical;
pub mod hasher;

pub use canonical::canonical_json;
pub use hasher::ContentHasher;
