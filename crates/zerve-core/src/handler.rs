use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::CoreResult;

/// Handler for an action type that is not built in.
///
/// Modules outside the engine (system integrations and the like) contribute
/// handlers; the dispatcher routes unrecognized action types to them.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, payload: Value) -> CoreResult<Value>;
}

/// Mapping from action type to handler, merged from module contributions at
/// startup.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn ActionHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, builder style.
    pub fn with(mut self, action_type: impl Into<String>, handler: impl ActionHandler + 'static) -> Self {
        self.register(action_type, Arc::new(handler));
        self
    }

    pub fn register(&mut self, action_type: impl Into<String>, handler: Arc<dyn ActionHandler>) {
        let action_type = action_type.into();
        if self.handlers.insert(action_type.clone(), handler).is_some() {
            warn!(action = %action_type, "handler replaced");
        }
    }

    /// Fold another module's handlers into this registry. Entries of `other`
    /// win on conflict.
    pub fn merge(mut self, other: HandlerRegistry) -> Self {
        for (action_type, handler) in other.handlers {
            self.register(action_type, handler);
        }
        self
    }

    pub fn get(&self, action_type: &str) -> Option<&Arc<dyn ActionHandler>> {
        self.handlers.get(action_type)
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.handlers.contains_key(action_type)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("action_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Echo;

    #[async_trait]
    impl ActionHandler for Echo {
        async fn handle(&self, payload: Value) -> CoreResult<Value> {
            Ok(json!({ "echo": payload }))
        }
    }

    struct Constant(Value);

    #[async_trait]
    impl ActionHandler for Constant {
        async fn handle(&self, _payload: Value) -> CoreResult<Value> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn registered_handler_runs() {
        let registry = HandlerRegistry::new().with("Test/Echo", Echo);
        let handler = registry.get("Test/Echo").unwrap();
        assert_eq!(handler.handle(json!(1)).await.unwrap(), json!({"echo": 1}));
        assert!(registry.get("Test/Other").is_none());
    }

    #[tokio::test]
    async fn merge_prefers_later_module() {
        let first = HandlerRegistry::new()
            .with("A", Constant(json!(1)))
            .with("B", Constant(json!("b")));
        let second = HandlerRegistry::new().with("A", Constant(json!(2)));
        let merged = first.merge(second);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["A", "B"]);
        let a = merged.get("A").unwrap();
        assert_eq!(a.handle(Value::Null).await.unwrap(), json!(2));
    }

    #[test]
    fn empty_registry() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("anything"));
        assert!(format!("{registry:?}").contains("HandlerRegistry"));
    }
}
