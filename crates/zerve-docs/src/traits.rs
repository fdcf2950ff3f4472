//! The [`DocStore`] trait defining the doc storage interface.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Storage backend for named docs.
///
/// Implementations must be thread-safe and must validate names with
/// [`validate_doc_name`](crate::names::validate_doc_name) before touching
/// storage. Writes to one name are serialized so that
/// [`compare_and_swap`](DocStore::compare_and_swap) is atomic with respect to
/// every other write of that name through the same store.
#[async_trait]
pub trait DocStore: Send + Sync {
    /// Read a doc's value. Returns `Ok(None)` if it was never written.
    async fn get_doc(&self, name: &str) -> Result<Option<Value>>;

    /// Create or replace a doc's value.
    async fn set_doc(&self, name: &str, value: &Value) -> Result<()>;

    /// Soft-delete a doc into the trash. Fails with `NotFound` if absent.
    async fn delete_doc(&self, name: &str) -> Result<()>;

    /// All doc names, sorted.
    async fn list_docs(&self) -> Result<Vec<String>>;

    /// Replace the value only if the current value equals `expected`
    /// (`None` meaning absent). Returns `Ok(false)` without writing when the
    /// current value differs.
    async fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<&Value>,
        new: &Value,
    ) -> Result<bool>;
}
