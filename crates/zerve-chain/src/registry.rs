use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

/// A reducer refused to apply an action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ReducerError(String);

impl ReducerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Pure state transition for one action type.
///
/// `state` is `None` before the first commit of a chain. Reducers must depend
/// only on their inputs: replaying the same chain must always produce the
/// same state.
pub trait Reducer: Send + Sync {
    fn reduce(&self, state: Option<&Value>, action: &Value) -> Result<Value, ReducerError>;
}

impl<F> Reducer for F
where
    F: Fn(Option<&Value>, &Value) -> Result<Value, ReducerError> + Send + Sync,
{
    fn reduce(&self, state: Option<&Value>, action: &Value) -> Result<Value, ReducerError> {
        self(state, action)
    }
}

/// Mapping from action type to reducer.
///
/// Each module contributes its own registry; the application merges them at
/// startup and hands the result to the evaluator.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    reducers: BTreeMap<String, Arc<dyn Reducer>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure reducer, builder style.
    pub fn with<F>(mut self, action_type: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(Option<&Value>, &Value) -> Result<Value, ReducerError> + Send + Sync + 'static,
    {
        self.register(action_type, Arc::new(reducer));
        self
    }

    /// Register a reducer, replacing any previous one for the same type.
    pub fn register(&mut self, action_type: impl Into<String>, reducer: Arc<dyn Reducer>) {
        let action_type = action_type.into();
        if self.reducers.insert(action_type.clone(), reducer).is_some() {
            warn!(action = %action_type, "reducer replaced");
        }
    }

    /// Fold another module's contribution into this registry. Entries of
    /// `other` win on conflict.
    pub fn merge(mut self, other: ActionRegistry) -> Self {
        for (action_type, reducer) in other.reducers {
            self.register(action_type, reducer);
        }
        self
    }

    pub fn get(&self, action_type: &str) -> Option<&Arc<dyn Reducer>> {
        self.reducers.get(action_type)
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.reducers.contains_key(action_type)
    }

    /// Registered action types, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.reducers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl FromIterator<ActionRegistry> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = ActionRegistry>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::merge)
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("action_types", &self.reducers.keys().collect::<Vec<_>>())
            .finish()
    }
}
