//! Foundation types for the Zerve data engine.
//!
//! This crate provides the value-level vocabulary shared by every other Zerve
//! crate. Everything here is plain data: nothing touches the filesystem.
//!
//! # Key Types
//!
//! - [`BlockId`]: Content-addressed identifier (BLAKE3 hash) of a block
//! - [`BlockRef`]: `{ type: "BlockRef", id }` pointer to a block
//! - [`Commit`]: A block payload linking to the previous commit of a chain
//! - [`TreeState`]: Materialized result of replaying a chain
//! - [`Timestamp`]: Wall-clock milliseconds since the UNIX epoch

pub mod error;
pub mod id;
pub mod time;
pub mod value;

pub use error::TypeError;
pub use id::BlockId;
pub use time::Timestamp;
pub use value::{describe_kind, type_tag, BlockRef, Commit, TreeState};
