//! Content-addressed block storage for the Zerve data engine.
//!
//! Every JSON value handed to the store becomes an immutable [`Block`]
//! identified by the BLAKE3 hash of its canonical serialization. Blocks are
//! never edited; they are created, read, and soft-deleted into the
//! [`TrashStore`].
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`FsBlockStore`]: one file per block under `blocks/<hash>`
//! - [`InMemoryBlockStore`]: `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content addressing guarantees this).
//! 2. Rewriting an existing id is a no-op only when the stored bytes are
//!    identical; any difference is an integrity violation, never an
//!    overwrite.
//! 3. New files land via write-to-hidden-temp then rename, so readers never
//!    observe a partially written block.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod block;
pub mod error;
pub mod fs;
pub mod fsutil;
pub mod memory;
pub mod traits;
pub mod trash;

pub use block::Block;
pub use error::{StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
pub use trash::{TrashKey, TrashStore};
