//! Path evaluation.
//!
//! An eval path is `<doc>[/<segment>...]`. The doc's value is dereferenced
//! when it is a `BlockRef`, and a commit found there is replayed into its
//! chain state. The only sub-path understood is `.blocks/<id>`, which reads a
//! block extracted during that replay.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use zerve_chain::{BlockCache, ChainError};
use zerve_types::{BlockId, BlockRef, Commit};

use crate::dispatcher::Dispatcher;
use crate::error::{CoreError, CoreResult};

/// Sub-path segment addressing blocks extracted during evaluation.
pub const BLOCKS_SEGMENT: &str = ".blocks";

/// A parsed eval path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalPath {
    pub doc: String,
    pub rest: Vec<String>,
}

impl EvalPath {
    pub fn parse(path: &str) -> CoreResult<Self> {
        let mut segments = path.split('/');
        let doc = segments.next().unwrap_or_default();
        if doc.is_empty() {
            return Err(CoreError::UnsupportedPath {
                path: path.to_string(),
                reason: "path must start with a doc name".into(),
            });
        }
        Ok(Self {
            doc: doc.to_string(),
            rest: segments.map(str::to_string).collect(),
        })
    }
}

/// One commit of a chain, as shown by a history listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: BlockId,
    pub commit: Commit,
}

impl Dispatcher {
    /// Resolve `path` to a value.
    ///
    /// Returns `Ok(None)` when the doc does not exist, or when the path has
    /// segments beyond the doc that do not address an extracted block.
    pub async fn get_eval(&self, path: &str) -> CoreResult<Option<Value>> {
        let path_str = path;
        let path = EvalPath::parse(path_str)?;
        let Some(mut value) = self.docs.get_doc(&path.doc).await? else {
            return Ok(None);
        };

        let mut head_id = None;
        if let Some(block_ref) = BlockRef::from_value(&value) {
            value = self.blocks.get_block(&block_ref.id).await?;
            head_id = Some(block_ref.id);
        }

        if Commit::is_commit(&value) {
            let head = Commit::from_value(&value).map_err(|e| ChainError::ChainCorrupt {
                at: head_id.map_or_else(|| path.doc.clone(), |id| id.to_hex()),
                reason: e.to_string(),
            })?;
            let mut cache = BlockCache::new();
            let state = self.evaluator.eval_commit_chain(&head, &mut cache).await?;

            if path.rest.first().map(String::as_str) == Some(BLOCKS_SEGMENT) {
                if path.rest.len() > 2 {
                    return Err(CoreError::UnsupportedPath {
                        path: path_str.to_string(),
                        reason: format!("must query for {BLOCKS_SEGMENT}/<block id>"),
                    });
                }
                let block = path
                    .rest
                    .get(1)
                    .and_then(|id| id.parse::<BlockId>().ok())
                    .and_then(|id| cache.get(&id));
                return Ok(Some(match block {
                    Some(block) => block.content.clone(),
                    None => json!({ "response": null }),
                }));
            }
            value = state.into_value();
        }

        if !path.rest.is_empty() {
            debug!(path = path_str, "nested eval paths are not traversed");
            return Ok(None);
        }
        Ok(Some(value))
    }

    /// Commits of the chain in doc `name`, newest first, with their ids.
    ///
    /// Returns `Ok(None)` when the doc does not exist.
    pub async fn chain_log(&self, name: &str) -> CoreResult<Option<Vec<LogEntry>>> {
        let Some(value) = self.docs.get_doc(name).await? else {
            return Ok(None);
        };
        let Some(head_ref) = BlockRef::from_value(&value) else {
            return Err(ChainError::TypeMismatch {
                name: name.to_string(),
                found: zerve_types::describe_kind(&value),
            }
            .into());
        };
        let head = self.evaluator.load_commit(&head_ref.id).await?;
        let rollup = self.evaluator.rollup_blocks_in_commit_chain(&head).await?;

        let mut entries = Vec::with_capacity(rollup.len());
        let mut id = head_ref.id;
        for commit in rollup {
            let next = commit.on;
            entries.push(LogEntry { id, commit });
            match next {
                Some(on) => id = on,
                None => break,
            }
        }
        Ok(Some(entries))
    }
}

#[cfg(test)]
mod tests {
    use zerve_chain::{store_reducers, ActionRegistry, ReducerError};

    use super::*;
    use crate::dispatcher::tests::in_memory;
    use crate::handler::HandlerRegistry;

    fn reducers() -> ActionRegistry {
        store_reducers()
            .with("Increment", |state: Option<&Value>, _: &Value| {
                Ok(json!(state.and_then(Value::as_i64).unwrap_or(0) + 1))
            })
            .with("Upload", |_: Option<&Value>, action: &Value| {
                let content = action
                    .get("content")
                    .cloned()
                    .ok_or_else(|| ReducerError::new("missing content"))?;
                Ok(json!({
                    "value": null,
                    "children": {"file": {"type": "Block", "content": content}}
                }))
            })
    }

    async fn append(d: &Dispatcher, name: &str, value: Value) {
        d.dispatch("AppendChain", json!({"name": name, "value": value}))
            .await
            .unwrap();
    }

    #[test]
    fn parse_paths() {
        assert_eq!(
            EvalPath::parse("doc").unwrap(),
            EvalPath {
                doc: "doc".into(),
                rest: vec![]
            }
        );
        assert_eq!(EvalPath::parse("doc/.blocks/x").unwrap().rest, vec![".blocks", "x"]);
        assert!(matches!(
            EvalPath::parse(""),
            Err(CoreError::UnsupportedPath { .. })
        ));
        assert!(EvalPath::parse("/doc").is_err());
    }

    #[tokio::test]
    async fn counter_scenario() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        for _ in 0..3 {
            append(&d, "counter", json!({"type": "Increment"})).await;
        }
        assert_eq!(d.get_eval("counter").await.unwrap(), Some(json!(3)));

        let log = d.chain_log("counter").await.unwrap().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].commit.on, Some(log[1].id));
        assert!(log[2].commit.is_genesis());
    }

    #[tokio::test]
    async fn missing_doc_is_none() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        assert_eq!(d.get_eval("nothing").await.unwrap(), None);
        assert_eq!(d.chain_log("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn plain_doc_evaluates_to_its_value() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        d.dispatch("SetDoc", json!({"name": "cfg", "value": {"debug": true}}))
            .await
            .unwrap();
        assert_eq!(d.get_eval("cfg").await.unwrap(), Some(json!({"debug": true})));
        assert_eq!(d.get_eval("cfg/debug").await.unwrap(), None);
    }

    #[tokio::test]
    async fn block_ref_doc_is_dereferenced() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        let created = d
            .dispatch("CreateBlock", json!({"value": [1, 2, 3]}))
            .await
            .unwrap();
        d.dispatch("SetDoc", json!({"name": "list", "value": created}))
            .await
            .unwrap();
        assert_eq!(d.get_eval("list").await.unwrap(), Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn store_chain_evaluates() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        append(&d, "s", json!({"type": "WriteValue", "name": "a", "value": 1})).await;
        append(&d, "s", json!({"type": "WriteValue", "name": "b", "value": 2})).await;
        append(&d, "s", json!({"type": "Delete", "name": "a"})).await;
        assert_eq!(
            d.get_eval("s").await.unwrap(),
            Some(json!({"b": {"value": 2}}))
        );
    }

    #[tokio::test]
    async fn extracted_blocks_are_addressable() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        append(&d, "files", json!({"type": "Upload", "content": {"bytes": "abc"}})).await;

        let state = d.get_eval("files").await.unwrap().unwrap();
        let file = BlockRef::from_value(&state["children"]["file"]).unwrap();

        let path = format!("files/.blocks/{}", file.id);
        assert_eq!(d.get_eval(&path).await.unwrap(), Some(json!({"bytes": "abc"})));

        let miss = format!("files/.blocks/{}", BlockId::from_bytes(b"other"));
        assert_eq!(d.get_eval(&miss).await.unwrap(), Some(json!({"response": null})));

        // The extracted block was persisted as part of the evaluation.
        let fetched = d
            .dispatch("GetBlockJSON", json!({"id": file.id.to_hex()}))
            .await
            .unwrap();
        assert_eq!(fetched, json!({"bytes": "abc"}));
    }

    #[tokio::test]
    async fn deep_blocks_path_is_unsupported() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        append(&d, "files", json!({"type": "Upload", "content": 1})).await;
        let path = format!("files/.blocks/{}/more", BlockId::from_bytes(b"x"));
        assert!(matches!(
            d.get_eval(&path).await,
            Err(CoreError::UnsupportedPath { .. })
        ));
    }

    #[tokio::test]
    async fn other_sub_paths_of_chains_are_none() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        append(&d, "counter", json!({"type": "Increment"})).await;
        assert_eq!(d.get_eval("counter/value").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_action_evaluates_to_empty_state() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        append(&d, "u", json!({"type": "NotRegistered"})).await;
        assert_eq!(
            d.get_eval("u").await.unwrap(),
            Some(json!({"value": null, "children": {}}))
        );
    }

    #[tokio::test]
    async fn later_commits_replay_after_unknown_action() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        append(&d, "u", json!({"type": "Increment"})).await;
        append(&d, "u", json!({"type": "NotRegistered"})).await;
        append(&d, "u", json!({"type": "Increment"})).await;
        assert_eq!(d.get_eval("u").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn malformed_head_commit_reports_its_block_id() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        let created = d
            .dispatch("CreateBlock", json!({"value": {"type": "Commit", "value": 1}}))
            .await
            .unwrap();
        let id = BlockRef::from_value(&created).unwrap().id;
        d.dispatch("SetDoc", json!({"name": "broken", "value": created}))
            .await
            .unwrap();

        match d.get_eval("broken").await {
            Err(CoreError::Chain(ChainError::ChainCorrupt { at, .. })) => {
                assert_eq!(at, id.to_hex())
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_inline_commit_reports_doc_name() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        d.dispatch("SetDoc", json!({"name": "inline", "value": {"type": "Commit"}}))
            .await
            .unwrap();
        assert!(matches!(
            d.get_eval("inline").await,
            Err(CoreError::Chain(ChainError::ChainCorrupt { at, .. })) if at == "inline"
        ));
    }

    #[tokio::test]
    async fn chain_log_of_plain_doc_is_type_mismatch() {
        let d = in_memory(reducers(), HandlerRegistry::new());
        d.dispatch("SetDoc", json!({"name": "p", "value": 5}))
            .await
            .unwrap();
        assert!(matches!(
            d.chain_log("p").await,
            Err(CoreError::Chain(ChainError::TypeMismatch { .. }))
        ));
    }
}
