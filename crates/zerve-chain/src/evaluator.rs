//! Appending to, rolling up, and replaying commit chains.
//!
//! A chain lives in a doc whose value is a `BlockRef` to the newest commit
//! (the head). Each commit points at its predecessor through `on`, so the
//! chain is read by walking backwards from the head and replayed by folding
//! the reversed walk through the registered reducers.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use zerve_docs::DocStore;
use zerve_store::BlockStore;
use zerve_types::{describe_kind, BlockId, BlockRef, Commit, Timestamp, TreeState};

use crate::cache::BlockCache;
use crate::error::{ChainError, ChainResult};
use crate::extract::extract_blocks;
use crate::registry::ActionRegistry;

/// Tuning knobs for the evaluator.
#[derive(Clone, Debug)]
pub struct EvaluatorConfig {
    /// How many times `append_chain` retries after losing a head race.
    pub max_append_retries: u32,
    /// Longest chain a rollup will walk, or `None` for no limit.
    pub max_chain_depth: Option<usize>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_append_retries: 8,
            max_chain_depth: None,
        }
    }
}

/// Outcome of a successful append.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResult {
    /// Previous head, `None` for the genesis commit.
    pub on: Option<BlockId>,
    pub time: Timestamp,
    pub commit_id: BlockId,
    pub name: String,
}

/// Chain operations over a block store, a doc store, and a reducer registry.
pub struct ChainEvaluator {
    blocks: Arc<dyn BlockStore>,
    docs: Arc<dyn DocStore>,
    registry: Arc<ActionRegistry>,
    config: EvaluatorConfig,
}

impl ChainEvaluator {
    pub fn new(
        blocks: Arc<dyn BlockStore>,
        docs: Arc<dyn DocStore>,
        registry: Arc<ActionRegistry>,
        config: EvaluatorConfig,
    ) -> Self {
        Self {
            blocks,
            docs,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Append a commit carrying `value` to the chain in doc `name`.
    ///
    /// An absent doc starts a new chain. The head is advanced with
    /// compare-and-swap; when another append wins the race the commit is
    /// rebuilt on the new head and retried, so concurrent appends never lose
    /// commits.
    pub async fn append_chain(
        &self,
        name: &str,
        value: Value,
        message: Option<String>,
    ) -> ChainResult<AppendResult> {
        let mut attempts = 0;
        loop {
            let current = self.docs.get_doc(name).await?;
            let on = self.chain_head(name, current.as_ref()).await?;
            let time = Timestamp::now();
            let commit = Commit::new(on, value.clone(), message.clone(), time);
            let commit_ref = self.blocks.create_block(commit.to_value()).await?;

            if self
                .docs
                .compare_and_swap(name, current.as_ref(), &commit_ref.to_value())
                .await?
            {
                info!(
                    doc = name,
                    commit = %commit_ref.id.short_hex(),
                    action = commit.action_type().unwrap_or("-"),
                    "commit appended"
                );
                return Ok(AppendResult {
                    on,
                    time,
                    commit_id: commit_ref.id,
                    name: name.to_string(),
                });
            }

            attempts += 1;
            if attempts > self.config.max_append_retries {
                warn!(doc = name, attempts, "append gave up after repeated head races");
                return Err(ChainError::ConcurrentAppend {
                    name: name.to_string(),
                    attempts,
                });
            }
            debug!(doc = name, attempts, "chain head moved during append, retrying");
        }
    }

    /// Resolve the current head of the chain in doc `name`, checking the doc
    /// actually holds a chain.
    async fn chain_head(&self, name: &str, current: Option<&Value>) -> ChainResult<Option<BlockId>> {
        let Some(current) = current else {
            return Ok(None);
        };
        let Some(head) = BlockRef::from_value(current) else {
            return Err(ChainError::TypeMismatch {
                name: name.to_string(),
                found: describe_kind(current),
            });
        };
        let content = self.blocks.get_block(&head.id).await?;
        if !Commit::is_commit(&content) {
            return Err(ChainError::TypeMismatch {
                name: name.to_string(),
                found: format!("BlockRef to {}", describe_kind(&content)),
            });
        }
        Ok(Some(head.id))
    }

    /// Load and decode the commit stored in block `id`.
    pub async fn load_commit(&self, id: &BlockId) -> ChainResult<Commit> {
        let content = self.blocks.get_block(id).await?;
        Commit::from_value(&content).map_err(|e| ChainError::ChainCorrupt {
            at: id.to_hex(),
            reason: e.to_string(),
        })
    }

    /// Collect the commits of a chain, newest first, starting at `head`.
    ///
    /// The walk follows `on` links until the genesis commit or until a link
    /// points at a block that is not a commit; such a boundary block is not
    /// part of the result. Revisiting a commit, or walking past
    /// `max_chain_depth`, is reported as `ChainCorrupt`.
    pub async fn rollup_blocks_in_commit_chain(&self, head: &Commit) -> ChainResult<Vec<Commit>> {
        let mut rollup = vec![head.clone()];
        let mut seen = HashSet::new();
        let mut next = head.on;

        while let Some(id) = next {
            if !seen.insert(id) {
                return Err(ChainError::ChainCorrupt {
                    at: id.to_hex(),
                    reason: "commit visited twice".into(),
                });
            }
            if let Some(max) = self.config.max_chain_depth {
                if rollup.len() >= max {
                    return Err(ChainError::ChainCorrupt {
                        at: id.to_hex(),
                        reason: format!("chain is deeper than {max} commits"),
                    });
                }
            }

            let content = self.blocks.get_block(&id).await?;
            if !Commit::is_commit(&content) {
                debug!(block = %id.short_hex(), "rollup stopped at non-commit block");
                break;
            }
            let commit = Commit::from_value(&content).map_err(|e| ChainError::ChainCorrupt {
                at: id.to_hex(),
                reason: e.to_string(),
            })?;
            next = commit.on;
            rollup.push(commit);
        }

        Ok(rollup)
    }

    /// Replay the chain ending at `head` into a state.
    ///
    /// Commits are applied oldest first. Blocks extracted along the way land
    /// in `cache` and are persisted once the replay has finished.
    pub async fn eval_commit_chain(
        &self,
        head: &Commit,
        cache: &mut BlockCache,
    ) -> ChainResult<TreeState> {
        let rollup = self.rollup_blocks_in_commit_chain(head).await?;
        let mut state: Option<TreeState> = None;
        for commit in rollup.iter().rev() {
            state = Some(self.eval_commit_step(state.as_ref(), commit, cache)?);
        }
        cache.persist(self.blocks.as_ref()).await?;
        debug!(commits = rollup.len(), blocks = cache.len(), "chain evaluated");
        Ok(state.unwrap_or_else(TreeState::empty))
    }

    /// Apply one commit to the state before it.
    ///
    /// A commit whose action type has no reducer (or that carries no type at
    /// all) yields the empty state instead of failing, so chains written by a
    /// newer build still evaluate.
    pub fn eval_commit_step(
        &self,
        state: Option<&TreeState>,
        commit: &Commit,
        cache: &mut BlockCache,
    ) -> ChainResult<TreeState> {
        let Some(action_type) = commit.action_type() else {
            debug!("commit has no action type, yielding empty state");
            return Ok(TreeState::empty());
        };
        let Some(reducer) = self.registry.get(action_type) else {
            debug!(action = action_type, "no reducer registered, yielding empty state");
            return Ok(TreeState::empty());
        };
        let raw = reducer
            .reduce(state.map(TreeState::as_value), &commit.value)
            .map_err(|e| ChainError::Reducer {
                action: action_type.to_string(),
                reason: e.to_string(),
            })?;
        Ok(TreeState::new(extract_blocks(raw, cache)?))
    }
}

impl std::fmt::Debug for ChainEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEvaluator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
