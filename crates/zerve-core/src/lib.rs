//! Zerve data engine.
//!
//! Ties the block store, doc store, and chain evaluator together behind the
//! two operations the rest of an application uses:
//!
//! - [`Dispatcher::dispatch`] runs a write or lookup action by type name
//! - [`Dispatcher::get_eval`] resolves a path to its current value,
//!   replaying commit chains on the way
//!
//! [`CoreData::open`] builds everything from a [`CoreConfig`] and the
//! reducer and handler contributions of the application's modules.

pub mod action;
pub mod config;
pub mod data;
pub mod dispatcher;
pub mod error;
pub mod eval;
pub mod handler;

pub use action::{CoreAction, CoreResponse, ACTION_PREFIX};
pub use config::{CoreConfig, DataLayout};
pub use data::CoreData;
pub use dispatcher::Dispatcher;
pub use error::{CoreError, CoreResult};
pub use eval::{EvalPath, LogEntry, BLOCKS_SEGMENT};
pub use handler::{ActionHandler, HandlerRegistry};

// Re-export the types callers need to build registries and read results
pub use zerve_chain::{store_reducers, ActionRegistry, AppendResult, Reducer, ReducerError};
pub use zerve_types::{BlockId, BlockRef, Commit, Timestamp, TreeState};
