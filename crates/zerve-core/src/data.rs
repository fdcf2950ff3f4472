use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use zerve_chain::{ActionRegistry, ChainEvaluator};
use zerve_docs::{DocStore, FsDocStore};
use zerve_store::{BlockStore, FsBlockStore, TrashStore};

use crate::config::{CoreConfig, DataLayout};
use crate::dispatcher::Dispatcher;
use crate::error::CoreResult;
use crate::handler::HandlerRegistry;

/// The engine over a data directory.
///
/// Opening creates `blocks/`, `docs/` and `trash/` under the configured data
/// directory and wires the file stores into a [`Dispatcher`].
#[derive(Debug)]
pub struct CoreData {
    config: CoreConfig,
    layout: DataLayout,
    dispatcher: Dispatcher,
}

impl CoreData {
    /// Open the engine with the reducers and handlers contributed by the
    /// application's modules.
    pub async fn open(
        config: CoreConfig,
        reducers: ActionRegistry,
        handlers: HandlerRegistry,
    ) -> CoreResult<Self> {
        let layout = config.layout();
        layout.create().await?;

        let trash = TrashStore::open(layout.trash_dir()).await?;
        let blocks: Arc<dyn BlockStore> =
            Arc::new(FsBlockStore::open(layout.blocks_dir(), trash.clone()).await?);
        let docs: Arc<dyn DocStore> = Arc::new(FsDocStore::open(layout.docs_dir(), trash).await?);

        let evaluator = Arc::new(ChainEvaluator::new(
            Arc::clone(&blocks),
            Arc::clone(&docs),
            Arc::new(reducers),
            config.evaluator_config(),
        ));
        let dispatcher = Dispatcher::new(blocks, docs, evaluator, handlers);

        info!(
            data_dir = %layout.root().display(),
            reducers = dispatcher.evaluator().registry().len(),
            handlers = dispatcher.handlers().len(),
            "core data opened"
        );
        Ok(Self {
            config,
            layout,
            dispatcher,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn dispatch(&self, action_type: &str, payload: Value) -> CoreResult<Value> {
        self.dispatcher.dispatch(action_type, payload).await
    }

    pub async fn get_eval(&self, path: &str) -> CoreResult<Option<Value>> {
        self.dispatcher.get_eval(path).await
    }
}
