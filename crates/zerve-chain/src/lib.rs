//! Commit chains for the Zerve data engine.
//!
//! This crate is the heart of the engine. It provides:
//! - `appendChain`: extend a doc's chain with a new commit, guarded by
//!   compare-and-swap on the doc's head
//! - Rollup of a chain into its commits, newest first
//! - Deterministic replay of a chain through an [`ActionRegistry`] of
//!   reducers into a [`TreeState`](zerve_types::TreeState)
//! - Extraction of embedded `{ type: "Block", content }` values into
//!   content-addressed blocks collected in a [`BlockCache`]

pub mod cache;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod reducers;
pub mod registry;

pub use cache::BlockCache;
pub use error::{ChainError, ChainResult};
pub use evaluator::{AppendResult, ChainEvaluator, EvaluatorConfig};
pub use extract::{extract_blocks, EMBEDDED_BLOCK_TYPE};
pub use reducers::store_reducers;
pub use registry::{ActionRegistry, Reducer, ReducerError};
