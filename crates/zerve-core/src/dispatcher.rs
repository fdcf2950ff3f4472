use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use zerve_chain::ChainEvaluator;
use zerve_docs::DocStore;
use zerve_store::BlockStore;

use crate::action::{CoreAction, CoreResponse};
use crate::error::{CoreError, CoreResult};
use crate::handler::HandlerRegistry;

/// Routes actions to the stores, the chain evaluator, or a registered
/// handler.
pub struct Dispatcher {
    pub(crate) blocks: Arc<dyn BlockStore>,
    pub(crate) docs: Arc<dyn DocStore>,
    pub(crate) evaluator: Arc<ChainEvaluator>,
    handlers: HandlerRegistry,
}

impl Dispatcher {
    pub fn new(
        blocks: Arc<dyn BlockStore>,
        docs: Arc<dyn DocStore>,
        evaluator: Arc<ChainEvaluator>,
        handlers: HandlerRegistry,
    ) -> Self {
        Self {
            blocks,
            docs,
            evaluator,
            handlers,
        }
    }

    pub fn evaluator(&self) -> &ChainEvaluator {
        &self.evaluator
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Run an action by type name.
    ///
    /// Built-in types are decoded and executed here; anything else goes to
    /// the handler registry, and fails with `UnknownAction` when no handler
    /// is registered.
    pub async fn dispatch(&self, action_type: &str, payload: Value) -> CoreResult<Value> {
        if let Some(action) = CoreAction::parse(action_type, payload.clone())? {
            return self.dispatch_action(action).await?.into_value();
        }
        let Some(handler) = self.handlers.get(action_type) else {
            return Err(CoreError::UnknownAction(action_type.to_string()));
        };
        debug!(action = action_type, "dispatching to handler");
        handler.handle(payload).await
    }

    /// Execute a decoded built-in action.
    pub async fn dispatch_action(&self, action: CoreAction) -> CoreResult<CoreResponse> {
        debug!(action = action.action_type(), "dispatching");
        let response = match action {
            CoreAction::CreateBlock(p) => CoreResponse::BlockRef(self.blocks.create_block(p.value).await?),
            CoreAction::GetBlockJson(p) => CoreResponse::Value(self.blocks.get_block(&p.id).await?),
            CoreAction::SetDoc(p) => {
                self.docs.set_doc(&p.name, &p.value).await?;
                CoreResponse::Empty
            }
            CoreAction::DeleteDoc(p) => {
                self.docs.delete_doc(&p.name).await?;
                CoreResponse::Null
            }
            CoreAction::DeleteBlock(p) => {
                self.blocks.delete_block(&p.id).await?;
                CoreResponse::Null
            }
            CoreAction::AppendChain(p) => {
                CoreResponse::Appended(self.evaluator.append_chain(&p.name, p.value, p.message).await?)
            }
            CoreAction::ListBlocks => {
                let ids = self.blocks.list_blocks().await?;
                CoreResponse::Children(ids.iter().map(|id| id.to_hex()).collect())
            }
            CoreAction::ListDocs => CoreResponse::Children(self.docs.list_docs().await?),
        };
        Ok(response)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("evaluator", &self.evaluator)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}
