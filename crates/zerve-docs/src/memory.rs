//! In-memory doc store for testing and ephemeral use.
//!
//! [`InMemoryDocStore`] keeps docs in a `BTreeMap` protected by a `RwLock`.
//! Deleted docs move to an in-memory trash map keyed like the file trash.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{DocError, Result};
use crate::names::validate_doc_name;
use crate::traits::DocStore;

/// An in-memory implementation of [`DocStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryDocStore {
    docs: RwLock<BTreeMap<String, Value>>,
    trash: RwLock<HashMap<String, Value>>,
}

impl InMemoryDocStore {
    /// Create a new empty doc store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value a deleted doc held, keyed `doc-<name>`.
    pub fn trashed(&self, name: &str) -> Result<Option<Value>> {
        let trash = self
            .trash
            .read()
            .map_err(|e| DocError::Poisoned(e.to_string()))?;
        Ok(trash.get(&format!("doc-{name}")).cloned())
    }
}

#[async_trait]
impl DocStore for InMemoryDocStore {
    async fn get_doc(&self, name: &str) -> Result<Option<Value>> {
        validate_doc_name(name)?;
        let docs = self
            .docs
            .read()
            .map_err(|e| DocError::Poisoned(e.to_string()))?;
        Ok(docs.get(name).cloned())
    }

    async fn set_doc(&self, name: &str, value: &Value) -> Result<()> {
        validate_doc_name(name)?;
        let mut docs = self
            .docs
            .write()
            .map_err(|e| DocError::Poisoned(e.to_string()))?;
        docs.insert(name.to_string(), value.clone());
        Ok(())
    }

    async fn delete_doc(&self, name: &str) -> Result<()> {
        validate_doc_name(name)?;
        let removed = self
            .docs
            .write()
            .map_err(|e| DocError::Poisoned(e.to_string()))?
            .remove(name)
            .ok_or_else(|| DocError::NotFound {
                name: name.to_string(),
            })?;
        self.trash
            .write()
            .map_err(|e| DocError::Poisoned(e.to_string()))?
            .insert(format!("doc-{name}"), removed);
        Ok(())
    }

    async fn list_docs(&self) -> Result<Vec<String>> {
        let docs = self
            .docs
            .read()
            .map_err(|e| DocError::Poisoned(e.to_string()))?;
        Ok(docs.keys().cloned().collect())
    }

    async fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<&Value>,
        new: &Value,
    ) -> Result<bool> {
        validate_doc_name(name)?;
        let mut docs = self
            .docs
            .write()
            .map_err(|e| DocError::Poisoned(e.to_string()))?;
        if docs.get(name) != expected {
            return Ok(false);
        }
        docs.insert(name.to_string(), new.clone());
        Ok(true)
    }
}
