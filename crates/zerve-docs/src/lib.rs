//! Named mutable documents for the Zerve data engine.
//!
//! A doc is a named slot holding one JSON value, typically a `BlockRef` to
//! the head commit of a chain. Docs are the only mutable state in the engine;
//! blocks never change.
//!
//! # Architecture
//!
//! - **Absent vs null.** Reading a doc that was never written yields `None`,
//!   which is distinct from a doc explicitly set to `null`.
//! - **Soft delete.** Deleting a doc renames its file into the trash as
//!   `doc-<name>`.
//! - **Compare-and-swap.** [`DocStore::compare_and_swap`] replaces a value only
//!   if it still equals what the caller last observed, which lets chain
//!   appends detect a head that moved underneath them.
//!
//! # Modules
//!
//! - [`error`]: Error types for doc operations
//! - [`names`]: Doc name validation
//! - [`traits`]: The [`DocStore`] trait
//! - [`fs`]: File-backed [`FsDocStore`]
//! - [`memory`]: In-memory [`InMemoryDocStore`] for tests

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;

pub use error::{DocError, Result};
pub use fs::FsDocStore;
pub use memory::InMemoryDocStore;
pub use names::validate_doc_name;
pub use traits::DocStore;
